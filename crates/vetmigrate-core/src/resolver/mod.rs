//! Identity Resolver: canonical dedup keys for person-like records.
//!
//! The legacy store has no person identity beyond free-text columns, so
//! the normalized phone serves as the identity key. Multiple legacy
//! records often share one real phone (family members registered
//! separately, re-entered clients); those collide on the key and are
//! resolved deterministically: the first-seen legacy id wins. Since the
//! extractor yields ascending legacy-id order, "first seen" is also
//! "lowest id", and re-runs always pick the same winner.
//!
//! Records with no usable phone get a synthetic key derived from their
//! legacy id, so they stay unique and stable across runs.

mod phone;

pub use phone::*;

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{LegacyClient, LegacyStaff};

/// Anything the resolver can derive an identity from.
///
/// Parameterizing over entity type keeps phone handling in one place
/// instead of re-implemented per migration script.
pub trait IdentitySource {
    /// Legacy numeric id.
    fn legacy_id(&self) -> i64;
    /// Preferred phone column (mobile).
    fn primary_phone(&self) -> Option<&str>;
    /// Fallback phone column (landline).
    fn secondary_phone(&self) -> Option<&str>;
}

impl IdentitySource for LegacyClient {
    fn legacy_id(&self) -> i64 {
        self.legacy_id
    }
    fn primary_phone(&self) -> Option<&str> {
        self.mobile.as_deref()
    }
    fn secondary_phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }
}

impl IdentitySource for LegacyStaff {
    fn legacy_id(&self) -> i64 {
        self.legacy_id
    }
    fn primary_phone(&self) -> Option<&str> {
        self.mobile.as_deref()
    }
    fn secondary_phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }
}

/// Diagnostic record of one identity collision.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CollisionReport {
    /// The shared identity key
    pub key: String,
    /// All legacy ids that produced the key, in source order
    pub legacy_ids: Vec<i64>,
    /// The id chosen as canonical (first seen)
    pub winner: i64,
}

/// Result of resolving a batch of records: a 1:1 mapping from identity
/// key to winning legacy id, plus the full collision log.
#[derive(Debug, Clone, Default)]
pub struct ResolvedIdentities {
    /// Winning legacy id -> identity key
    keys: HashMap<i64, String>,
    /// One report per key that had more than one legacy id
    pub collisions: Vec<CollisionReport>,
}

impl ResolvedIdentities {
    /// The identity key for a legacy id, if that id won its key.
    pub fn key_for(&self, legacy_id: i64) -> Option<&str> {
        self.keys.get(&legacy_id).map(String::as_str)
    }

    /// Whether this legacy id is the canonical record for its key.
    pub fn is_winner(&self, legacy_id: i64) -> bool {
        self.keys.contains_key(&legacy_id)
    }

    /// Number of distinct identities resolved.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when nothing was resolved.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Total records that lost a collision (for the summary counters).
    pub fn collision_losers(&self) -> usize {
        self.collisions
            .iter()
            .map(|c| c.legacy_ids.len() - 1)
            .sum()
    }
}

/// Resolve identity keys for a slice of records.
///
/// Input order must be the extractor's stable ascending-id order; the
/// first record seen for a key is the winner.
pub fn resolve_identities<T: IdentitySource>(records: &[T]) -> ResolvedIdentities {
    // key -> legacy ids in source order
    let mut by_key: HashMap<String, Vec<i64>> = HashMap::new();
    let mut key_order: Vec<String> = Vec::new();

    for record in records {
        let key = record
            .primary_phone()
            .and_then(normalize_phone)
            .or_else(|| record.secondary_phone().and_then(normalize_phone))
            .unwrap_or_else(|| synthetic_key(record.legacy_id()));

        let ids = by_key.entry(key.clone()).or_insert_with(|| {
            key_order.push(key);
            Vec::new()
        });
        ids.push(record.legacy_id());
    }

    let mut resolved = ResolvedIdentities::default();
    for key in key_order {
        let ids = &by_key[&key];
        let winner = ids[0];
        resolved.keys.insert(winner, key.clone());
        if ids.len() > 1 {
            tracing::warn!(
                key = %key,
                legacy_ids = ?ids,
                winner,
                "identity collision, first-seen record wins"
            );
            resolved.collisions.push(CollisionReport {
                key,
                legacy_ids: ids.clone(),
                winner,
            });
        }
    }

    resolved
}
