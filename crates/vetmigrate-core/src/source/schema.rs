//! Reference schema for the legacy store.
//!
//! The pipeline never writes to the legacy store; this schema exists so
//! tests can build fixture databases that match the shape of the real one.

/// Legacy store schema (read side of the migration).
pub const LEGACY_SCHEMA: &str = r#"
-- ============================================================================
-- Clients (pet owners)
-- ============================================================================

CREATE TABLE IF NOT EXISTS clients (
    id INTEGER PRIMARY KEY,
    surname TEXT,
    first_name TEXT,
    patronymic TEXT,
    phone TEXT,
    mobile TEXT,
    email TEXT,
    street TEXT,
    city TEXT,
    clinic_id INTEGER,
    deleted INTEGER NOT NULL DEFAULT 0
);

-- ============================================================================
-- Patients (animals)
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id INTEGER PRIMARY KEY,
    name TEXT,
    species_code INTEGER,
    breed TEXT,
    sex_code INTEGER,
    birth_date TEXT,
    microchip TEXT,
    notes TEXT,
    clinic_id INTEGER,
    deleted INTEGER NOT NULL DEFAULT 0
);

-- ============================================================================
-- Client <-> patient bridge (ownership history, ordered by id)
-- ============================================================================

CREATE TABLE IF NOT EXISTS client_patients (
    id INTEGER PRIMARY KEY,
    client_id INTEGER NOT NULL,
    patient_id INTEGER NOT NULL,
    client_deleted INTEGER NOT NULL DEFAULT 0,
    patient_deleted INTEGER NOT NULL DEFAULT 0
);

-- ============================================================================
-- Staff (system users)
-- ============================================================================

CREATE TABLE IF NOT EXISTS staff (
    id INTEGER PRIMARY KEY,
    surname TEXT,
    first_name TEXT,
    patronymic TEXT,
    role_code INTEGER,
    department_code INTEGER,
    phone TEXT,
    mobile TEXT,
    email TEXT,
    clinic_id INTEGER,
    active INTEGER NOT NULL DEFAULT 1,
    deleted INTEGER NOT NULL DEFAULT 0
);
"#;
