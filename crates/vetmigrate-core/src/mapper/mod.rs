//! Entity Mapper: pure transforms from legacy rows to target shapes.
//!
//! No I/O here. Everything is a function of its arguments so the whole
//! module is unit-testable without a database. Validation happens here
//! too: a record the mapper rejects never reaches the Batch Loader, which
//! is what keeps a bad row from poisoning a whole batch.

use chrono::{Datelike, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{
    LegacyClient, LegacyPatient, LegacyStaff, NewOwner, NewPatient, NewUser, Role, Sex, Species,
};

/// Placeholder for patients whose legacy row has no name.
pub const UNNAMED_PATIENT: &str = "Unnamed";

/// Legacy "empty" sentinel found in email columns.
const EMAIL_SENTINEL: &str = "х"; // Cyrillic kha, a legacy data-entry habit

/// Assemble a full name from surname / first-name / patronymic fragments.
///
/// Empty fragments are skipped, the rest joined with single spaces.
/// Returns `None` when every fragment is blank; callers treat that as a
/// validation failure for owners and staff.
pub fn full_name(
    surname: Option<&str>,
    first_name: Option<&str>,
    patronymic: Option<&str>,
) -> Option<String> {
    let parts: Vec<&str> = [surname, first_name, patronymic]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// Clean a raw email field.
///
/// Rejects the legacy placeholder sentinel, keeps only the first of
/// multiple comma-separated addresses, and requires both `@` and `.`.
pub fn clean_email(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    if raw.trim().to_lowercase() == EMAIL_SENTINEL {
        return None;
    }

    let first = raw.split(',').next()?.trim();
    if first.contains('@') && first.contains('.') {
        Some(first.to_string())
    } else {
        None
    }
}

/// Build a composite address from city and street parts.
///
/// Legacy operators used `*` and the literal string `null` as "empty"
/// markers; both are skipped.
pub fn build_address(city: Option<&str>, street: Option<&str>) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();

    if let Some(city) = city {
        let city = city.trim();
        if !city.is_empty() && city != "*" {
            parts.push(city);
        }
    }

    if let Some(street) = street {
        let street = street.trim();
        if !street.is_empty() && street != "*" && !street.eq_ignore_ascii_case("null") {
            parts.push(street);
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Remap a legacy species code. Unknown and negative codes map to Other.
pub fn map_species(code: Option<i64>) -> Species {
    match code {
        Some(1) => Species::Dog,
        Some(2) => Species::Cat,
        Some(3) => Species::Horse,
        Some(4) => Species::Bird,
        Some(5) => Species::Rodent,
        Some(6) => Species::Rabbit,
        Some(7) => Species::Reptile,
        Some(8) => Species::Exotic,
        _ => Species::Other,
    }
}

/// Remap a legacy sex code. The legacy system tracks neutered animals as
/// separate codes (5, 6); those fold into female/male.
pub fn map_sex(code: Option<i64>) -> Sex {
    match code {
        Some(1) | Some(3) | Some(6) => Sex::Male,
        Some(2) | Some(4) | Some(5) => Sex::Female,
        _ => Sex::Unknown,
    }
}

/// Remap a legacy role code. The legacy system grew overlapping codes
/// over the years; unknown codes default to Doctor, the most common role.
pub fn map_role(code: Option<i64>) -> Role {
    match code {
        Some(2) | Some(3) | Some(10002) => Role::Admin,
        Some(7) => Role::Manager,
        Some(15) => Role::Director,
        _ => Role::Doctor,
    }
}

/// Remap a legacy department code to a display name.
pub fn map_department(code: Option<i64>) -> Option<String> {
    let code = code?;
    let name = match code {
        0 | 1 => "General practice",
        10001 => "Surgery",
        10002 => "Therapy",
        10003 => "Diagnostics",
        10005 => "Inpatient care",
        other => return Some(format!("Department {other}")),
    };
    Some(name.to_string())
}

/// Parse and sanity-bound a legacy birth date against a reference day.
///
/// Legacy rows hold placeholder years (1900, 3000); anything outside
/// (1950, today's year + 1] is dropped rather than migrated.
pub fn bound_birth_date(raw: Option<&str>, today: NaiveDate) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(raw?.trim(), "%Y-%m-%d").ok()?;
    if date.year() > 1950 && date.year() <= today.year() + 1 {
        Some(date)
    } else {
        None
    }
}

/// Clean a patient name, substituting a placeholder for blanks.
pub fn clean_patient_name(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => UNNAMED_PATIENT.to_string(),
    }
}

/// Clean a breed string; `-` is a legacy "no breed" marker.
pub fn clean_breed(raw: Option<&str>) -> Option<String> {
    let breed = raw?.trim();
    if breed.is_empty() || breed == "-" {
        None
    } else {
        Some(breed.to_string())
    }
}

/// Derive a login for a migrated user: email local-part or phone digits,
/// suffixed with the legacy id to keep logins unique; `user_<id>` as the
/// last resort.
pub fn username_for(email: Option<&str>, phone: Option<&str>, legacy_id: i64) -> String {
    if let Some(email) = email {
        if let Some(local) = email.split('@').next() {
            if email.contains('@') && !local.is_empty() {
                let cleaned: String = local
                    .to_lowercase()
                    .chars()
                    .map(|c| {
                        if c.is_ascii_alphanumeric() || c == '_' {
                            c
                        } else {
                            '_'
                        }
                    })
                    .collect();
                return format!("{cleaned}_{legacy_id}");
            }
        }
    }

    if let Some(phone) = phone {
        let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
        if !digits.is_empty() {
            return format!("{digits}_{legacy_id}");
        }
    }

    format!("user_{legacy_id}")
}

/// Map a legacy client to an owner row.
///
/// `identity_key` is the resolved phone (or synthetic key) this record
/// won. Returns `None` when the record has no usable name; that is a
/// per-record validation skip, counted but never inserted.
pub fn map_client(
    client: &LegacyClient,
    identity_key: &str,
    tenant_id: &str,
    branch_id: Option<&str>,
) -> Option<NewOwner> {
    let name = full_name(
        client.surname.as_deref(),
        client.first_name.as_deref(),
        client.patronymic.as_deref(),
    )?;

    Some(NewOwner {
        id: Uuid::new_v4().to_string(),
        tenant_id: tenant_id.to_string(),
        branch_id: branch_id.map(String::from),
        name,
        phone: identity_key.to_string(),
        email: clean_email(client.email.as_deref()),
        address: build_address(client.city.as_deref(), client.street.as_deref()),
        legacy_id: client.legacy_id,
    })
}

/// Map a legacy patient to a patient row. Patients are never dropped for
/// a missing name; they get the placeholder instead.
pub fn map_patient(
    patient: &LegacyPatient,
    tenant_id: &str,
    branch_id: Option<&str>,
) -> NewPatient {
    NewPatient {
        id: Uuid::new_v4().to_string(),
        tenant_id: tenant_id.to_string(),
        branch_id: branch_id.map(String::from),
        name: clean_patient_name(patient.name.as_deref()),
        species: map_species(patient.species_code),
        breed: clean_breed(patient.breed.as_deref()),
        sex: map_sex(patient.sex_code),
        birth_date: bound_birth_date(patient.birth_date.as_deref(), Utc::now().date_naive()),
        microchip: patient
            .microchip
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(String::from),
        notes: patient.notes.clone(),
        legacy_id: patient.legacy_id,
    }
}

/// Map a legacy staff row to a user row. Returns `None` when the record
/// has no usable name (validation skip, same policy as owners).
pub fn map_staff(staff: &LegacyStaff, tenant_id: &str, branch_id: Option<&str>) -> Option<NewUser> {
    let name = full_name(
        staff.surname.as_deref(),
        staff.first_name.as_deref(),
        staff.patronymic.as_deref(),
    )?;

    let email = staff
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(String::from);
    let phone = staff
        .mobile
        .as_deref()
        .or(staff.phone.as_deref())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from);

    Some(NewUser {
        id: Uuid::new_v4().to_string(),
        tenant_id: tenant_id.to_string(),
        branch_id: branch_id.map(String::from),
        username: username_for(email.as_deref(), phone.as_deref(), staff.legacy_id),
        full_name: name,
        role: map_role(staff.role_code),
        phone,
        email,
        department: map_department(staff.department_code),
        legacy_id: staff.legacy_id,
    })
}
