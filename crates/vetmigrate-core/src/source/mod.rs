//! Source Extractor: read-only access to the legacy store.
//!
//! Contract: every fetch returns rows in ascending legacy-id order with the
//! soft-delete predicate applied and nothing else. The stable order is what
//! makes first-wins collision resolution and primary-owner selection
//! deterministic across runs. A connection failure is fatal; a malformed
//! row surfaces as a typed SQLite error, never a silent drop.

mod schema;

pub use schema::*;

use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use thiserror::Error;

use crate::models::{LegacyClient, LegacyPatient, LegacyStaff, OwnershipRow};

/// Legacy store errors.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("legacy store error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("cannot open legacy store at {path}: {source}")]
    Open {
        path: String,
        source: rusqlite::Error,
    },
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Read-only connection to the legacy store.
pub struct SourceDb {
    conn: Connection,
}

impl SourceDb {
    /// Open the legacy store read-only. Fails fast if unreachable.
    pub fn open<P: AsRef<Path>>(path: P) -> SourceResult<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| SourceError::Open {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        Ok(Self { conn })
    }

    /// Create a writable in-memory legacy store with the reference schema
    /// (for tests and fixtures).
    pub fn open_in_memory() -> SourceResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(LEGACY_SCHEMA)?;
        Ok(Self { conn })
    }

    /// Raw connection access (fixture building in tests).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Fetch non-deleted client rows, optionally scoped to one legacy
    /// clinic, in ascending id order.
    pub fn fetch_clients(&self, clinic_id: Option<i64>) -> SourceResult<Vec<LegacyClient>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, surname, first_name, patronymic, phone, mobile,
                   email, street, city, clinic_id
            FROM clients
            WHERE deleted = 0
              AND (?1 IS NULL OR clinic_id = ?1)
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map([clinic_id], |row| {
            Ok(LegacyClient {
                legacy_id: row.get(0)?,
                surname: row.get(1)?,
                first_name: row.get(2)?,
                patronymic: row.get(3)?,
                phone: row.get(4)?,
                mobile: row.get(5)?,
                email: row.get(6)?,
                street: row.get(7)?,
                city: row.get(8)?,
                clinic_id: row.get(9)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Fetch non-deleted patient rows, optionally scoped to one legacy
    /// clinic, in ascending id order.
    pub fn fetch_patients(&self, clinic_id: Option<i64>) -> SourceResult<Vec<LegacyPatient>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, species_code, breed, sex_code, birth_date,
                   microchip, notes, clinic_id
            FROM patients
            WHERE deleted = 0
              AND (?1 IS NULL OR clinic_id = ?1)
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map([clinic_id], |row| {
            Ok(LegacyPatient {
                legacy_id: row.get(0)?,
                name: row.get(1)?,
                species_code: row.get(2)?,
                breed: row.get(3)?,
                sex_code: row.get(4)?,
                birth_date: row.get(5)?,
                microchip: row.get(6)?,
                notes: row.get(7)?,
                clinic_id: row.get(8)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Fetch active, non-deleted staff rows in ascending id order.
    pub fn fetch_staff(&self, clinic_id: Option<i64>) -> SourceResult<Vec<LegacyStaff>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, surname, first_name, patronymic, role_code,
                   department_code, phone, mobile, email, clinic_id
            FROM staff
            WHERE deleted = 0 AND active = 1
              AND (?1 IS NULL OR clinic_id = ?1)
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map([clinic_id], |row| {
            Ok(LegacyStaff {
                legacy_id: row.get(0)?,
                surname: row.get(1)?,
                first_name: row.get(2)?,
                patronymic: row.get(3)?,
                role_code: row.get(4)?,
                department_code: row.get(5)?,
                phone: row.get(6)?,
                mobile: row.get(7)?,
                email: row.get(8)?,
                clinic_id: row.get(9)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Fetch ownership bridge rows where neither side is deleted, in
    /// ascending bridge-id order (historical association order).
    pub fn fetch_ownership_rows(&self) -> SourceResult<Vec<OwnershipRow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, client_id, patient_id
            FROM client_patients
            WHERE client_deleted = 0 AND patient_deleted = 0
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(OwnershipRow {
                bridge_id: row.get(0)?,
                client_id: row.get(1)?,
                patient_id: row.get(2)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
