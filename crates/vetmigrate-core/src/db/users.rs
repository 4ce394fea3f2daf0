//! User (staff) operations against the target store.

use rusqlite::{params, OptionalExtension};
use std::collections::HashSet;

use super::{DbResult, TargetDb};
use crate::models::NewUser;

impl TargetDb {
    /// Insert a single user (fixtures; bulk writes go through the Batch
    /// Loader).
    pub fn insert_user(&self, user: &NewUser) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO users (
                id, tenant_id, branch_id, username, full_name, role,
                phone, email, department, legacy_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                user.id,
                user.tenant_id,
                user.branch_id,
                user.username,
                user.full_name,
                user.role.as_str(),
                user.phone,
                user.email,
                user.department,
                user.legacy_id,
            ],
        )?;
        Ok(())
    }

    /// Lineage ids of users already migrated for a tenant.
    pub fn user_legacy_ids(&self, tenant_id: &str) -> DbResult<HashSet<i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT legacy_id FROM users WHERE tenant_id = ? AND legacy_id IS NOT NULL",
        )?;
        let rows = stmt.query_map([tenant_id], |row| row.get::<_, i64>(0))?;
        rows.collect::<Result<HashSet<_>, _>>().map_err(Into::into)
    }

    /// Count users carrying a lineage id.
    pub fn count_users_with_lineage(&self, tenant_id: &str) -> DbResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE tenant_id = ? AND legacy_id IS NOT NULL",
            [tenant_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Find a user by lineage id (username and role).
    pub fn find_user_by_legacy(
        &self,
        tenant_id: &str,
        legacy_id: i64,
    ) -> DbResult<Option<(String, String)>> {
        self.conn
            .query_row(
                "SELECT username, role FROM users WHERE tenant_id = ?1 AND legacy_id = ?2",
                params![tenant_id, legacy_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(Into::into)
    }
}
