//! Migration pipeline: wires extractor, resolver, mapper, loader,
//! relationship builder and auditor into per-entity runs.
//!
//! Each run is idempotent. The skip-set of already-migrated lineage ids
//! is rebuilt from the target store at the start of every run, so
//! re-running after a crash (or just twice) only writes what is missing.

use std::collections::HashMap;

use thiserror::Error;

use crate::audit::{AuditError, Auditor};
use crate::db::{DbError, TargetDb};
use crate::linker::{build_links, group_bridge_rows, resolve_owner_refs};
use crate::loader::BatchLoader;
use crate::mapper::{map_client, map_patient, map_staff};
use crate::models::{MigrationSummary, NewOwner, NewPatient, NewUser, OwnerLink};
use crate::resolver::resolve_identities;
use crate::source::{SourceDb, SourceError};

/// Pipeline failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The requested tenant does not exist or is not active.
    #[error("unknown or inactive tenant '{0}'")]
    UnknownTenant(String),

    /// Legacy store error.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Target store error.
    #[error(transparent)]
    Db(#[from] DbError),

    /// Post-migration integrity check failed.
    #[error(transparent)]
    Audit(#[from] AuditError),
}

/// Result alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// One tenant's migration run: both stores, the tenant scope, and the
/// clinic-to-branch mapping loaded up front.
pub struct MigrationContext {
    source: SourceDb,
    target: TargetDb,
    tenant_id: String,
    loader: BatchLoader,
    branch_map: HashMap<i64, String>,
}

impl MigrationContext {
    /// Build a context, validating the tenant before any extraction.
    pub fn new(
        source: SourceDb,
        target: TargetDb,
        tenant_id: &str,
        batch_size: usize,
    ) -> PipelineResult<Self> {
        if !target.tenant_exists(tenant_id)? {
            return Err(PipelineError::UnknownTenant(tenant_id.to_string()));
        }
        let branch_map = target.branch_map(tenant_id)?;
        tracing::info!(
            tenant_id,
            branches = branch_map.len(),
            batch_size,
            "migration context ready"
        );
        Ok(Self {
            source,
            target,
            tenant_id: tenant_id.to_string(),
            loader: BatchLoader::new(batch_size),
            branch_map,
        })
    }

    fn branch_for(&self, clinic_id: Option<i64>) -> Option<&str> {
        clinic_id
            .and_then(|id| self.branch_map.get(&id))
            .map(String::as_str)
    }

    /// Migrate clients into owners.
    pub fn migrate_owners(&mut self) -> PipelineResult<MigrationSummary> {
        let clients = self.source.fetch_clients(None)?;
        let mut summary = MigrationSummary::new("owners", clients.len());

        let resolved = resolve_identities(&clients);
        summary.collisions = resolved.collision_losers();

        let mut staged: Vec<NewOwner> = Vec::with_capacity(resolved.len());
        for client in &clients {
            let Some(key) = resolved.key_for(client.legacy_id) else {
                continue; // collision loser, already counted
            };
            match map_client(client, key, &self.tenant_id, self.branch_for(client.clinic_id)) {
                Some(owner) => staged.push(owner),
                None => {
                    tracing::warn!(legacy_id = client.legacy_id, "client has no usable name, skipped");
                    summary.skipped_invalid += 1;
                }
            }
        }

        let existing = self.target.owner_legacy_ids(&self.tenant_id)?;
        let (new_rows, skipped) = BatchLoader::partition_new(staged, &existing);
        summary.skipped_duplicate = skipped;

        summary.created = self.loader.load(&mut self.target, &new_rows)?;

        let auditor = Auditor::new(&self.target, &self.tenant_id);
        auditor.verify_owner_parity((existing.len() + summary.created) as i64)?;

        tracing::info!(created = summary.created, "owner migration complete");
        Ok(summary)
    }

    /// Migrate patients together with their owner links.
    pub fn migrate_patients(&mut self) -> PipelineResult<MigrationSummary> {
        let patients = self.source.fetch_patients(None)?;
        let bridge = self.source.fetch_ownership_rows()?;
        let mut summary = MigrationSummary::new("patients", patients.len());

        let grouped = group_bridge_rows(&bridge);
        let owner_ids = self.target.owner_ids_by_legacy(&self.tenant_id)?;
        let existing = self.target.patient_legacy_ids(&self.tenant_id)?;

        let mut staged: Vec<(NewPatient, Vec<OwnerLink>)> = Vec::new();
        for legacy in &patients {
            if existing.contains(&legacy.legacy_id) {
                summary.skipped_duplicate += 1;
                continue;
            }

            let legacy_owners = grouped
                .get(&legacy.legacy_id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let resolved_owners = resolve_owner_refs(legacy_owners, &owner_ids);
            if resolved_owners.is_empty() {
                tracing::warn!(legacy_id = legacy.legacy_id, "patient has no migrated owner, skipped");
                summary.skipped_no_match += 1;
                continue;
            }

            let patient = map_patient(legacy, &self.tenant_id, self.branch_for(legacy.clinic_id));
            let links = build_links(&patient.id, &resolved_owners);
            staged.push((patient, links));
        }

        summary.created = self.loader.load_patients(&mut self.target, &staged)?;

        // Every migrated patient carries at least one link with exactly
        // one primary, so all parity checks share one expected count.
        let expected = (existing.len() + summary.created) as i64;
        let auditor = Auditor::new(&self.target, &self.tenant_id);
        auditor.verify_patient_parity(expected)?;
        auditor.verify_patient_links(expected)?;
        auditor.verify_primary_links(expected)?;
        auditor.verify_no_orphans()?;

        tracing::info!(created = summary.created, "patient migration complete");
        Ok(summary)
    }

    /// Migrate staff into users.
    pub fn migrate_users(&mut self) -> PipelineResult<MigrationSummary> {
        let staff = self.source.fetch_staff(None)?;
        let mut summary = MigrationSummary::new("users", staff.len());

        let mut staged: Vec<NewUser> = Vec::with_capacity(staff.len());
        for member in &staff {
            match map_staff(member, &self.tenant_id, self.branch_for(member.clinic_id)) {
                Some(user) => staged.push(user),
                None => {
                    tracing::warn!(legacy_id = member.legacy_id, "staff record has no usable name, skipped");
                    summary.skipped_invalid += 1;
                }
            }
        }

        let existing = self.target.user_legacy_ids(&self.tenant_id)?;
        let (new_rows, skipped) = BatchLoader::partition_new(staged, &existing);
        summary.skipped_duplicate = skipped;

        summary.created = self.loader.load(&mut self.target, &new_rows)?;

        let auditor = Auditor::new(&self.target, &self.tenant_id);
        auditor.verify_user_parity((existing.len() + summary.created) as i64)?;

        tracing::info!(created = summary.created, "user migration complete");
        Ok(summary)
    }

    /// Access the target store (integration tests and reporting).
    pub fn target(&self) -> &TargetDb {
        &self.target
    }
}
