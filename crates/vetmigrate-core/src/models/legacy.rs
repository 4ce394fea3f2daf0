//! Typed rows from the legacy store.
//!
//! The legacy system exposes loosely-typed, noisy data: name fragments in
//! separate columns, phone numbers in arbitrary formats, sentinel strings
//! where NULL was meant. These structs are produced by a validating parse
//! immediately after extraction so every downstream stage works on a known
//! shape. They are never mutated.

use serde::{Deserialize, Serialize};

/// A client (pet owner) row from the legacy store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LegacyClient {
    /// Legacy numeric id (lineage id on the target row)
    pub legacy_id: i64,
    /// Surname fragment
    pub surname: Option<String>,
    /// First-name fragment
    pub first_name: Option<String>,
    /// Patronymic fragment
    pub patronymic: Option<String>,
    /// Landline phone, raw formatting
    pub phone: Option<String>,
    /// Mobile phone, raw formatting (preferred for identity)
    pub mobile: Option<String>,
    /// Raw email field; may hold sentinels or comma-separated lists
    pub email: Option<String>,
    /// Street part of the address; `*` means "not filled in"
    pub street: Option<String>,
    /// City part of the address; `*` means "not filled in"
    pub city: Option<String>,
    /// Legacy clinic id (maps to a target branch)
    pub clinic_id: Option<i64>,
}

/// A patient (animal) row from the legacy store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LegacyPatient {
    /// Legacy numeric id
    pub legacy_id: i64,
    /// Animal name; may be blank
    pub name: Option<String>,
    /// Legacy species code (closed enumeration, remapped)
    pub species_code: Option<i64>,
    /// Breed name; `-` means "none"
    pub breed: Option<String>,
    /// Legacy sex code (closed enumeration, remapped)
    pub sex_code: Option<i64>,
    /// Birth date as stored (`YYYY-MM-DD` text); legacy data holds
    /// placeholder years like 1900 and 3000
    pub birth_date: Option<String>,
    /// Microchip number
    pub microchip: Option<String>,
    /// Free-text notes / special marks
    pub notes: Option<String>,
    /// Legacy clinic id
    pub clinic_id: Option<i64>,
}

/// A staff (user) row from the legacy store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LegacyStaff {
    /// Legacy numeric id
    pub legacy_id: i64,
    /// Surname fragment
    pub surname: Option<String>,
    /// First-name fragment
    pub first_name: Option<String>,
    /// Patronymic fragment
    pub patronymic: Option<String>,
    /// Legacy role code (closed enumeration, remapped)
    pub role_code: Option<i64>,
    /// Legacy department code
    pub department_code: Option<i64>,
    /// Landline phone
    pub phone: Option<String>,
    /// Mobile phone
    pub mobile: Option<String>,
    /// Email
    pub email: Option<String>,
    /// Legacy clinic id
    pub clinic_id: Option<i64>,
}

/// A row from the legacy client↔patient bridge table.
///
/// Bridge-id order is the order owners were historically associated with a
/// patient; the Relationship Builder relies on it to pick the primary owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnershipRow {
    /// Bridge row id (defines association order)
    pub bridge_id: i64,
    /// Legacy client id
    pub client_id: i64,
    /// Legacy patient id
    pub patient_id: i64,
}
