//! Relationship Builder: patient-owner links from the legacy bridge table.
//!
//! The legacy store models ownership as a bare bridge table. The target
//! store keeps the many-to-many shape but adds a primary-owner flag on
//! each link. The first owner listed for a patient (by ascending bridge
//! row id) becomes the primary; bridge rows whose owner never made it
//! through the owner migration (collision losers, invalid records) are
//! dropped with a warning rather than failing the run.

use std::collections::{BTreeMap, HashMap};

use crate::models::{OwnerLink, OwnershipRow};

/// Group raw bridge rows by legacy patient id.
///
/// Owner ids keep bridge-row order; a repeated (patient, owner) pair is
/// collapsed to its first occurrence so link inserts stay unique.
pub fn group_bridge_rows(rows: &[OwnershipRow]) -> BTreeMap<i64, Vec<i64>> {
    let mut grouped: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    for row in rows {
        let owners = grouped.entry(row.patient_id).or_default();
        if !owners.contains(&row.client_id) {
            owners.push(row.client_id);
        }
    }
    grouped
}

/// Translate legacy owner ids into target owner ids, preserving order.
///
/// Ids with no target counterpart are skipped; the caller decides whether
/// a patient with zero resolved owners is an error or just unlinked.
pub fn resolve_owner_refs(legacy_ids: &[i64], owner_ids: &HashMap<i64, String>) -> Vec<String> {
    let mut resolved = Vec::with_capacity(legacy_ids.len());
    for legacy_id in legacy_ids {
        match owner_ids.get(legacy_id) {
            Some(id) => resolved.push(id.clone()),
            None => {
                tracing::warn!(legacy_owner_id = legacy_id, "bridge row references unmigrated owner");
            }
        }
    }
    resolved
}

/// Build links for one patient. The first owner is the primary.
pub fn build_links(patient_id: &str, owner_ids: &[String]) -> Vec<OwnerLink> {
    owner_ids
        .iter()
        .enumerate()
        .map(|(i, owner_id)| OwnerLink::new(patient_id, owner_id, i == 0))
        .collect()
}
