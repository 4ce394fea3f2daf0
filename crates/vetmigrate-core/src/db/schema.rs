//! Target store schema definition.

/// Complete multi-tenant target schema.
///
/// Every migrated table carries a `legacy_id` lineage column with a
/// per-tenant unique index; the Batch Loader's skip-set is built from it,
/// and the index makes accidental double-insertion a hard error rather
/// than silent duplication.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Tenancy
-- ============================================================================

CREATE TABLE IF NOT EXISTS tenants (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    status TEXT NOT NULL DEFAULT 'active',
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS branches (
    id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL REFERENCES tenants(id),
    name TEXT NOT NULL,
    legacy_clinic_id INTEGER,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_branches_tenant ON branches(tenant_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_branches_legacy
    ON branches(tenant_id, legacy_clinic_id)
    WHERE legacy_clinic_id IS NOT NULL;

-- ============================================================================
-- Owners (clients)
-- ============================================================================

CREATE TABLE IF NOT EXISTS owners (
    id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL REFERENCES tenants(id),
    branch_id TEXT REFERENCES branches(id),
    name TEXT NOT NULL,
    phone TEXT NOT NULL,
    email TEXT,
    address TEXT,
    legacy_id INTEGER,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_owners_legacy
    ON owners(tenant_id, legacy_id)
    WHERE legacy_id IS NOT NULL;
CREATE INDEX IF NOT EXISTS idx_owners_phone ON owners(tenant_id, phone);

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL REFERENCES tenants(id),
    branch_id TEXT REFERENCES branches(id),
    name TEXT NOT NULL,
    species TEXT NOT NULL,
    breed TEXT,
    sex TEXT NOT NULL,
    birth_date TEXT,
    microchip TEXT,
    notes TEXT,
    legacy_id INTEGER,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_patients_legacy
    ON patients(tenant_id, legacy_id)
    WHERE legacy_id IS NOT NULL;

-- ============================================================================
-- Patient <-> owner links (exactly one primary per patient)
-- ============================================================================

CREATE TABLE IF NOT EXISTS patient_owners (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id),
    owner_id TEXT NOT NULL REFERENCES owners(id),
    is_primary INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (patient_id, owner_id)
);

CREATE INDEX IF NOT EXISTS idx_patient_owners_owner ON patient_owners(owner_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_patient_owners_primary
    ON patient_owners(patient_id)
    WHERE is_primary = 1;

-- ============================================================================
-- Users (staff)
-- ============================================================================

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL REFERENCES tenants(id),
    branch_id TEXT REFERENCES branches(id),
    username TEXT NOT NULL UNIQUE,
    full_name TEXT NOT NULL,
    role TEXT NOT NULL,
    phone TEXT,
    email TEXT,
    department TEXT,
    status TEXT NOT NULL DEFAULT 'active',
    legacy_id INTEGER,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_users_legacy
    ON users(tenant_id, legacy_id)
    WHERE legacy_id IS NOT NULL;
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_lineage_unique_per_tenant() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute(
            "INSERT INTO tenants (id, name, slug) VALUES ('t1', 'Clinic', 'clinic')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO owners (id, tenant_id, name, phone, legacy_id) VALUES ('o1', 't1', 'A', '+70000000001', 100)",
            [],
        )
        .unwrap();

        // Second row with the same lineage id must be rejected
        let result = conn.execute(
            "INSERT INTO owners (id, tenant_id, name, phone, legacy_id) VALUES ('o2', 't1', 'B', '+70000000002', 100)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_single_primary_per_patient() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute_batch(
            r#"
            INSERT INTO tenants (id, name, slug) VALUES ('t1', 'Clinic', 'clinic');
            INSERT INTO owners (id, tenant_id, name, phone) VALUES ('o1', 't1', 'A', '+70000000001');
            INSERT INTO owners (id, tenant_id, name, phone) VALUES ('o2', 't1', 'B', '+70000000002');
            INSERT INTO patients (id, tenant_id, name, species, sex)
                VALUES ('p1', 't1', 'Rex', 'dog', 'male');
            INSERT INTO patient_owners (id, patient_id, owner_id, is_primary)
                VALUES ('l1', 'p1', 'o1', 1);
            "#,
        )
        .unwrap();

        // A second primary link for the same patient must be rejected
        let result = conn.execute(
            "INSERT INTO patient_owners (id, patient_id, owner_id, is_primary) VALUES ('l2', 'p1', 'o2', 1)",
            [],
        );
        assert!(result.is_err());
    }
}
