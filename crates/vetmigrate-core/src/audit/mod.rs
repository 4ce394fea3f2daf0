//! Verification Auditor: post-migration integrity checks.
//!
//! Every check is a count comparison against the target store, scoped to
//! one tenant and to rows carrying a lineage id, so pre-existing native
//! data never trips an audit. A failed check is an error, not a log
//! line; the pipeline propagates it and the process exits non-zero.

use thiserror::Error;

use crate::db::{DbError, TargetDb};

/// Audit failures.
#[derive(Debug, Error)]
pub enum AuditError {
    /// A count check came back wrong.
    #[error("integrity check '{check}' failed: expected {expected}, found {actual}")]
    IntegrityViolation {
        /// Name of the failed check
        check: &'static str,
        /// Count the migration accounting predicted
        expected: i64,
        /// Count the target store actually holds
        actual: i64,
    },

    /// Underlying store error while running a check.
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result alias for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;

/// Runs integrity checks against one tenant's migrated rows.
pub struct Auditor<'a> {
    db: &'a TargetDb,
    tenant_id: &'a str,
}

impl<'a> Auditor<'a> {
    pub fn new(db: &'a TargetDb, tenant_id: &'a str) -> Self {
        Self { db, tenant_id }
    }

    fn check(&self, name: &'static str, expected: i64, actual: i64) -> AuditResult<()> {
        if expected != actual {
            return Err(AuditError::IntegrityViolation {
                check: name,
                expected,
                actual,
            });
        }
        tracing::debug!(check = name, count = actual, "integrity check passed");
        Ok(())
    }

    /// Migrated owner count matches the accounting.
    pub fn verify_owner_parity(&self, expected: i64) -> AuditResult<()> {
        let actual = self.db.count_owners_with_lineage(self.tenant_id)?;
        self.check("owner parity", expected, actual)
    }

    /// Migrated patient count matches the accounting.
    pub fn verify_patient_parity(&self, expected: i64) -> AuditResult<()> {
        let actual = self.db.count_patients_with_lineage(self.tenant_id)?;
        self.check("patient parity", expected, actual)
    }

    /// Migrated user count matches the accounting.
    pub fn verify_user_parity(&self, expected: i64) -> AuditResult<()> {
        let actual = self.db.count_users_with_lineage(self.tenant_id)?;
        self.check("user parity", expected, actual)
    }

    /// Every migrated patient that was staged with owners has at least
    /// one link row.
    pub fn verify_patient_links(&self, expected_linked: i64) -> AuditResult<()> {
        let actual = self.db.count_linked_patients(self.tenant_id)?;
        self.check("linked patients", expected_linked, actual)
    }

    /// Exactly one primary owner per linked patient. Comparing both the
    /// primary-link count and the distinct-patient count to the same
    /// expectation catches the two-primaries and zero-primaries cases,
    /// which would cancel out in a single aggregate.
    pub fn verify_primary_links(&self, expected_linked: i64) -> AuditResult<()> {
        let primary_links = self.db.count_primary_links(self.tenant_id)?;
        self.check("primary links", expected_linked, primary_links)?;

        let patients_with_primary = self.db.count_patients_with_primary(self.tenant_id)?;
        self.check("patients with a primary owner", expected_linked, patients_with_primary)
    }

    /// No migrated patient references a branch outside its tenant.
    pub fn verify_no_orphans(&self) -> AuditResult<()> {
        let orphans = self.db.count_orphan_branch_refs(self.tenant_id)?;
        self.check("orphan branch references", 0, orphans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewOwner, NewPatient, OwnerLink, Sex, Species};

    fn setup_db() -> TargetDb {
        let db = TargetDb::open_in_memory().unwrap();
        db.insert_tenant("t1", "Clinic", "clinic").unwrap();
        db
    }

    fn owner(id: &str, legacy_id: i64) -> NewOwner {
        NewOwner {
            id: id.to_string(),
            tenant_id: "t1".to_string(),
            branch_id: None,
            name: "Owner".to_string(),
            phone: format!("+7999000{legacy_id:04}"),
            email: None,
            address: None,
            legacy_id,
        }
    }

    fn patient(id: &str, legacy_id: i64) -> NewPatient {
        NewPatient {
            id: id.to_string(),
            tenant_id: "t1".to_string(),
            branch_id: None,
            name: "Rex".to_string(),
            species: Species::Dog,
            breed: None,
            sex: Sex::Unknown,
            birth_date: None,
            microchip: None,
            notes: None,
            legacy_id,
        }
    }

    #[test]
    fn test_parity_checks_pass_and_fail() {
        let db = setup_db();
        db.insert_owner(&owner("o1", 1)).unwrap();

        let auditor = Auditor::new(&db, "t1");
        assert!(auditor.verify_owner_parity(1).is_ok());

        let err = auditor.verify_owner_parity(2).unwrap_err();
        match err {
            AuditError::IntegrityViolation {
                check,
                expected,
                actual,
            } => {
                assert_eq!(check, "owner parity");
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_primary_link_checks() {
        let db = setup_db();
        db.insert_owner(&owner("o1", 1)).unwrap();
        db.insert_owner(&owner("o2", 2)).unwrap();
        db.insert_patient(&patient("p1", 10)).unwrap();
        db.insert_owner_link(&OwnerLink::new("p1", "o1", true))
            .unwrap();
        db.insert_owner_link(&OwnerLink::new("p1", "o2", false))
            .unwrap();

        let auditor = Auditor::new(&db, "t1");
        assert!(auditor.verify_patient_parity(1).is_ok());
        assert!(auditor.verify_patient_links(1).is_ok());
        assert!(auditor.verify_primary_links(1).is_ok());
    }

    #[test]
    fn test_zero_primary_detected() {
        let db = setup_db();
        db.insert_owner(&owner("o1", 1)).unwrap();
        db.insert_patient(&patient("p1", 10)).unwrap();
        db.insert_owner_link(&OwnerLink::new("p1", "o1", false))
            .unwrap();

        let auditor = Auditor::new(&db, "t1");
        assert!(auditor.verify_patient_links(1).is_ok());
        assert!(auditor.verify_primary_links(1).is_err());
    }

    #[test]
    fn test_no_orphans_on_clean_store() {
        let db = setup_db();
        db.insert_patient(&patient("p1", 10)).unwrap();
        let auditor = Auditor::new(&db, "t1");
        assert!(auditor.verify_no_orphans().is_ok());
    }
}
