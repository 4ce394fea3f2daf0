//! Patient and patient-owner link operations against the target store.

use rusqlite::{params, OptionalExtension};
use std::collections::HashSet;

use super::{DbResult, TargetDb};
use crate::models::{NewPatient, OwnerLink};

impl TargetDb {
    /// Insert a single patient (fixtures; bulk writes go through the
    /// Batch Loader).
    pub fn insert_patient(&self, patient: &NewPatient) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO patients (
                id, tenant_id, branch_id, name, species, breed, sex,
                birth_date, microchip, notes, legacy_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                patient.id,
                patient.tenant_id,
                patient.branch_id,
                patient.name,
                patient.species.as_str(),
                patient.breed,
                patient.sex.as_str(),
                patient.birth_date.map(|d| d.to_string()),
                patient.microchip,
                patient.notes,
                patient.legacy_id,
            ],
        )?;
        Ok(())
    }

    /// Insert a single patient-owner link (fixtures).
    pub fn insert_owner_link(&self, link: &OwnerLink) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO patient_owners (id, patient_id, owner_id, is_primary)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![link.id, link.patient_id, link.owner_id, link.is_primary],
        )?;
        Ok(())
    }

    /// Lineage ids of patients already migrated for a tenant.
    pub fn patient_legacy_ids(&self, tenant_id: &str) -> DbResult<HashSet<i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT legacy_id FROM patients WHERE tenant_id = ? AND legacy_id IS NOT NULL",
        )?;
        let rows = stmt.query_map([tenant_id], |row| row.get::<_, i64>(0))?;
        rows.collect::<Result<HashSet<_>, _>>().map_err(Into::into)
    }

    /// Count patients carrying a lineage id.
    pub fn count_patients_with_lineage(&self, tenant_id: &str) -> DbResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM patients WHERE tenant_id = ? AND legacy_id IS NOT NULL",
            [tenant_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Count migrated patients that have at least one owner link.
    pub fn count_linked_patients(&self, tenant_id: &str) -> DbResult<i64> {
        let count = self.conn.query_row(
            r#"
            SELECT COUNT(DISTINCT po.patient_id)
            FROM patient_owners po
            JOIN patients p ON p.id = po.patient_id
            WHERE p.tenant_id = ? AND p.legacy_id IS NOT NULL
            "#,
            [tenant_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Count primary links of migrated patients.
    pub fn count_primary_links(&self, tenant_id: &str) -> DbResult<i64> {
        let count = self.conn.query_row(
            r#"
            SELECT COUNT(*)
            FROM patient_owners po
            JOIN patients p ON p.id = po.patient_id
            WHERE p.tenant_id = ? AND p.legacy_id IS NOT NULL AND po.is_primary = 1
            "#,
            [tenant_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Count distinct patients holding a primary link (a patient with two
    /// primaries and a patient with none would otherwise cancel out).
    pub fn count_patients_with_primary(&self, tenant_id: &str) -> DbResult<i64> {
        let count = self.conn.query_row(
            r#"
            SELECT COUNT(DISTINCT po.patient_id)
            FROM patient_owners po
            JOIN patients p ON p.id = po.patient_id
            WHERE p.tenant_id = ? AND p.legacy_id IS NOT NULL AND po.is_primary = 1
            "#,
            [tenant_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Count patients whose branch reference does not exist under their
    /// tenant (orphan check).
    pub fn count_orphan_branch_refs(&self, tenant_id: &str) -> DbResult<i64> {
        let count = self.conn.query_row(
            r#"
            SELECT COUNT(*)
            FROM patients p
            WHERE p.tenant_id = ?
              AND p.branch_id IS NOT NULL
              AND NOT EXISTS (
                  SELECT 1 FROM branches b
                  WHERE b.id = p.branch_id AND b.tenant_id = p.tenant_id
              )
            "#,
            [tenant_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Find a patient by lineage id.
    pub fn find_patient_by_legacy(
        &self,
        tenant_id: &str,
        legacy_id: i64,
    ) -> DbResult<Option<(String, String)>> {
        self.conn
            .query_row(
                "SELECT id, name FROM patients WHERE tenant_id = ?1 AND legacy_id = ?2",
                params![tenant_id, legacy_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Owner links for a patient, primary first then by creation order.
    pub fn links_for_patient(&self, patient_id: &str) -> DbResult<Vec<(String, bool)>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT owner_id, is_primary
            FROM patient_owners
            WHERE patient_id = ?
            ORDER BY is_primary DESC, created_at, id
            "#,
        )?;
        let rows = stmt.query_map([patient_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?))
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewOwner, Sex, Species};

    fn setup_db() -> TargetDb {
        let db = TargetDb::open_in_memory().unwrap();
        db.insert_tenant("t1", "Clinic", "clinic").unwrap();
        db
    }

    fn patient(id: &str, legacy_id: i64) -> NewPatient {
        NewPatient {
            id: id.to_string(),
            tenant_id: "t1".to_string(),
            branch_id: None,
            name: "Rex".to_string(),
            species: Species::Dog,
            breed: None,
            sex: Sex::Male,
            birth_date: None,
            microchip: None,
            notes: None,
            legacy_id,
        }
    }

    fn owner(id: &str, legacy_id: i64) -> NewOwner {
        NewOwner {
            id: id.to_string(),
            tenant_id: "t1".to_string(),
            branch_id: None,
            name: "Ivanov".to_string(),
            phone: format!("+7999000{legacy_id:04}"),
            email: None,
            address: None,
            legacy_id,
        }
    }

    #[test]
    fn test_link_counts() {
        let db = setup_db();
        db.insert_owner(&owner("o1", 1)).unwrap();
        db.insert_owner(&owner("o2", 2)).unwrap();
        db.insert_patient(&patient("p1", 10)).unwrap();
        db.insert_owner_link(&OwnerLink::new("p1", "o1", true)).unwrap();
        db.insert_owner_link(&OwnerLink::new("p1", "o2", false)).unwrap();

        assert_eq!(db.count_patients_with_lineage("t1").unwrap(), 1);
        assert_eq!(db.count_linked_patients("t1").unwrap(), 1);
        assert_eq!(db.count_primary_links("t1").unwrap(), 1);
        assert_eq!(db.count_patients_with_primary("t1").unwrap(), 1);
    }

    #[test]
    fn test_links_for_patient_primary_first() {
        let db = setup_db();
        db.insert_owner(&owner("o1", 1)).unwrap();
        db.insert_owner(&owner("o2", 2)).unwrap();
        db.insert_patient(&patient("p1", 10)).unwrap();
        db.insert_owner_link(&OwnerLink::new("p1", "o2", false)).unwrap();
        db.insert_owner_link(&OwnerLink::new("p1", "o1", true)).unwrap();

        let links = db.links_for_patient("p1").unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0], ("o1".to_string(), true));
    }

    #[test]
    fn test_orphan_branch_refs() {
        let db = setup_db();
        let mut p = patient("p1", 10);
        p.branch_id = Some("missing-branch".to_string());
        // FK is enforced, so sneak the bad row in with pragmas off
        db.conn().execute_batch("PRAGMA foreign_keys = OFF").unwrap();
        db.insert_patient(&p).unwrap();

        assert_eq!(db.count_orphan_branch_refs("t1").unwrap(), 1);
    }
}
