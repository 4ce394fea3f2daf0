//! Tenant and branch operations.

use rusqlite::{params, OptionalExtension};
use std::collections::HashMap;

use super::{DbResult, TargetDb};

/// A branch row (multi-tenancy scoping unit below tenant).
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub legacy_clinic_id: Option<i64>,
}

impl TargetDb {
    /// Check whether an active tenant exists.
    pub fn tenant_exists(&self, tenant_id: &str) -> DbResult<bool> {
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM tenants WHERE id = ? AND status = 'active'",
                [tenant_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Insert a tenant (fixture setup and provisioning).
    pub fn insert_tenant(&self, id: &str, name: &str, slug: &str) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO tenants (id, name, slug) VALUES (?1, ?2, ?3)",
            params![id, name, slug],
        )?;
        Ok(())
    }

    /// Insert a branch (fixture setup and provisioning).
    pub fn insert_branch(&self, branch: &Branch) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO branches (id, tenant_id, name, legacy_clinic_id)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                branch.id,
                branch.tenant_id,
                branch.name,
                branch.legacy_clinic_id,
            ],
        )?;
        Ok(())
    }

    /// Map legacy clinic ids to target branch ids for a tenant.
    pub fn branch_map(&self, tenant_id: &str) -> DbResult<HashMap<i64, String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT legacy_clinic_id, id
            FROM branches
            WHERE tenant_id = ? AND legacy_clinic_id IS NOT NULL
            "#,
        )?;

        let rows = stmt.query_map([tenant_id], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;

        rows.collect::<Result<HashMap<_, _>, _>>().map_err(Into::into)
    }
}
