//! Target entities in the multi-tenant schema.
//!
//! Each migrated row carries the legacy id it came from (`legacy_id`); the
//! Batch Loader uses it to skip rows that are already present, which is what
//! makes re-running the pipeline safe.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Species in the target schema.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Dog,
    Cat,
    Horse,
    Bird,
    Rodent,
    Rabbit,
    Reptile,
    Exotic,
    /// Default for unknown or negative legacy codes
    Other,
}

impl Species {
    /// Stable string form stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Dog => "dog",
            Species::Cat => "cat",
            Species::Horse => "horse",
            Species::Bird => "bird",
            Species::Rodent => "rodent",
            Species::Rabbit => "rabbit",
            Species::Reptile => "reptile",
            Species::Exotic => "exotic",
            Species::Other => "other",
        }
    }
}

/// Animal sex in the target schema.
///
/// The legacy system distinguishes neutered variants; the target schema
/// folds those into male/female.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    /// Default for unknown or negative legacy codes
    Unknown,
}

impl Sex {
    /// Stable string form stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
            Sex::Unknown => "unknown",
        }
    }
}

/// Staff role in the target schema.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Doctor,
    Admin,
    Manager,
    Director,
}

impl Role {
    /// Stable string form stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Director => "director",
        }
    }
}

/// An owner row ready for insertion into the target store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewOwner {
    /// Target id, generated locally (UUIDv4)
    pub id: String,
    /// Tenant the row belongs to
    pub tenant_id: String,
    /// Branch, resolved from the legacy clinic id
    pub branch_id: Option<String>,
    /// Full name assembled from legacy fragments
    pub name: String,
    /// Identity key: normalized phone, or a synthetic stand-in
    pub phone: String,
    /// Cleaned email
    pub email: Option<String>,
    /// Composite address (city, street)
    pub address: Option<String>,
    /// Legacy lineage id
    pub legacy_id: i64,
}

/// A patient row ready for insertion into the target store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPatient {
    /// Target id, generated locally (UUIDv4)
    pub id: String,
    /// Tenant the row belongs to
    pub tenant_id: String,
    /// Branch, resolved from the legacy clinic id
    pub branch_id: Option<String>,
    /// Animal name (placeholder if the legacy row had none)
    pub name: String,
    /// Remapped species
    pub species: Species,
    /// Cleaned breed
    pub breed: Option<String>,
    /// Remapped sex
    pub sex: Sex,
    /// Birth date, sanity-bounded
    pub birth_date: Option<NaiveDate>,
    /// Microchip number
    pub microchip: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Legacy lineage id
    pub legacy_id: i64,
}

/// A patient↔owner bridge row.
///
/// Exactly one link per patient has `is_primary = true`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnerLink {
    /// Target id, generated locally (UUIDv4)
    pub id: String,
    /// Target patient id
    pub patient_id: String,
    /// Target owner id
    pub owner_id: String,
    /// Canonical/default relationship marker
    pub is_primary: bool,
}

impl OwnerLink {
    /// Create a link with a fresh id.
    pub fn new(patient_id: &str, owner_id: &str, is_primary: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id: patient_id.to_string(),
            owner_id: owner_id.to_string(),
            is_primary,
        }
    }
}

/// A user (staff) row ready for insertion into the target store.
///
/// Migrated users carry no credentials; account activation is handled by
/// the surrounding application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewUser {
    /// Target id, generated locally (UUIDv4)
    pub id: String,
    /// Tenant the row belongs to
    pub tenant_id: String,
    /// Branch, resolved from the legacy clinic id
    pub branch_id: Option<String>,
    /// Login derived from email or phone, suffixed with the legacy id
    pub username: String,
    /// Full name assembled from legacy fragments
    pub full_name: String,
    /// Remapped role
    pub role: Role,
    /// Contact phone (mobile preferred)
    pub phone: Option<String>,
    /// Email
    pub email: Option<String>,
    /// Department name, remapped from the legacy code
    pub department: Option<String>,
    /// Legacy lineage id
    pub legacy_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_as_str() {
        assert_eq!(Species::Dog.as_str(), "dog");
        assert_eq!(Species::Other.as_str(), "other");
    }

    #[test]
    fn test_owner_link_new() {
        let link = OwnerLink::new("pat-1", "own-1", true);
        assert_eq!(link.patient_id, "pat-1");
        assert_eq!(link.owner_id, "own-1");
        assert!(link.is_primary);
        assert_eq!(link.id.len(), 36); // UUID format
    }
}
