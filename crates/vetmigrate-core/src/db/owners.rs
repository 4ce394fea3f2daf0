//! Owner operations against the target store.

use rusqlite::{params, OptionalExtension};
use std::collections::{HashMap, HashSet};

use super::{DbResult, TargetDb};
use crate::models::NewOwner;

impl TargetDb {
    /// Insert a single owner (fixtures and manual repair; bulk writes go
    /// through the Batch Loader).
    pub fn insert_owner(&self, owner: &NewOwner) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO owners (
                id, tenant_id, branch_id, name, phone, email, address, legacy_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                owner.id,
                owner.tenant_id,
                owner.branch_id,
                owner.name,
                owner.phone,
                owner.email,
                owner.address,
                owner.legacy_id,
            ],
        )?;
        Ok(())
    }

    /// Lineage ids of owners already migrated for a tenant (the Batch
    /// Loader's skip-set, rebuilt every run).
    pub fn owner_legacy_ids(&self, tenant_id: &str) -> DbResult<HashSet<i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT legacy_id FROM owners WHERE tenant_id = ? AND legacy_id IS NOT NULL",
        )?;
        let rows = stmt.query_map([tenant_id], |row| row.get::<_, i64>(0))?;
        rows.collect::<Result<HashSet<_>, _>>().map_err(Into::into)
    }

    /// Owner lineage map: legacy client id -> target owner id. The
    /// Relationship Builder translates bridge rows through it.
    pub fn owner_ids_by_legacy(&self, tenant_id: &str) -> DbResult<HashMap<i64, String>> {
        let mut stmt = self.conn.prepare(
            "SELECT legacy_id, id FROM owners WHERE tenant_id = ? AND legacy_id IS NOT NULL",
        )?;
        let rows = stmt.query_map([tenant_id], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;
        rows.collect::<Result<HashMap<_, _>, _>>().map_err(Into::into)
    }

    /// Count owners carrying a lineage id (row-count parity check).
    pub fn count_owners_with_lineage(&self, tenant_id: &str) -> DbResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM owners WHERE tenant_id = ? AND legacy_id IS NOT NULL",
            [tenant_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Find an owner by lineage id.
    pub fn find_owner_by_legacy(&self, tenant_id: &str, legacy_id: i64) -> DbResult<Option<NewOwner>> {
        self.conn
            .query_row(
                r#"
                SELECT id, tenant_id, branch_id, name, phone, email, address, legacy_id
                FROM owners
                WHERE tenant_id = ?1 AND legacy_id = ?2
                "#,
                params![tenant_id, legacy_id],
                |row| {
                    Ok(NewOwner {
                        id: row.get(0)?,
                        tenant_id: row.get(1)?,
                        branch_id: row.get(2)?,
                        name: row.get(3)?,
                        phone: row.get(4)?,
                        email: row.get(5)?,
                        address: row.get(6)?,
                        legacy_id: row.get(7)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Count owners sharing a phone within a tenant (collision audits).
    pub fn count_owners_by_phone(&self, tenant_id: &str, phone: &str) -> DbResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM owners WHERE tenant_id = ?1 AND phone = ?2",
            params![tenant_id, phone],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
