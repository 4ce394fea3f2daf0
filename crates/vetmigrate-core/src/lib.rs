//! Vetmigrate Core Library
//!
//! Multi-tenant migration pipeline moving veterinary clinic records out of
//! a legacy practice-management store into a modern multi-tenant schema.
//!
//! # Architecture
//!
//! ```text
//! Legacy store (read-only)
//!         │
//!         ▼
//!   Source Extractor        ascending-id order, soft-deletes excluded
//!         │
//!         ▼
//!   Identity Resolver       normalized phone = dedup key
//!         │                 first-seen wins collisions
//!         ▼
//!    Entity Mapper          pure legacy-row → target-row functions
//!         │
//!         ▼
//!     Batch Loader          set-based inserts, one tx per batch,
//!         │                 lineage skip-set makes re-runs idempotent
//!         ▼
//! Relationship Builder      patient-owner links, first owner primary
//!         │
//!         ▼
//! Verification Auditor      count parity, link integrity, exit non-zero
//! ```
//!
//! # Core Principle
//!
//! **Every run is safely repeatable.** The target store itself is the
//! checkpoint: lineage ids written with each row let a rerun skip what a
//! previous (possibly killed) run already committed.
//!
//! # Modules
//!
//! - [`source`]: read-only extraction from the legacy SQLite store
//! - [`resolver`]: phone normalization and identity collision handling
//! - [`mapper`]: field-level legacy-to-target transforms
//! - [`loader`]: batched, transactional, idempotent writes
//! - [`linker`]: patient-owner relationship construction
//! - [`audit`]: post-migration integrity checks
//! - [`pipeline`]: per-entity runs wiring the stages together
//! - [`db`]: target-store access layer
//! - [`models`]: legacy rows, target rows, run summaries

pub mod audit;
pub mod db;
pub mod linker;
pub mod loader;
pub mod mapper;
pub mod models;
pub mod pipeline;
pub mod resolver;
pub mod source;

// Re-export commonly used types
pub use audit::{AuditError, Auditor};
pub use db::{DbError, TargetDb};
pub use loader::{BatchLoader, DEFAULT_BATCH_SIZE};
pub use models::{
    LegacyClient, LegacyPatient, LegacyStaff, MigrationSummary, NewOwner, NewPatient, NewUser,
    OwnerLink, OwnershipRow, Role, Sex, Species,
};
pub use pipeline::{MigrationContext, PipelineError};
pub use resolver::{normalize_phone, resolve_identities, CollisionReport, ResolvedIdentities};
pub use source::{SourceDb, SourceError};
