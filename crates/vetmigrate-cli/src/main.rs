//! Command-line entry point for the migration pipeline.
//!
//! Store locations come from the environment (`VETMIGRATE_SOURCE_DB`,
//! `VETMIGRATE_TARGET_DB`); the entity to migrate and the tenant scope
//! come from the command line. Exits non-zero on any pipeline or audit
//! failure so shell-driven runbooks can gate on it.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vetmigrate_core::{MigrationContext, MigrationSummary, SourceDb, TargetDb, DEFAULT_BATCH_SIZE};

#[derive(Parser)]
#[command(name = "vetmigrate", version, about = "Legacy clinic data migration")]
struct Cli {
    /// Emit the run summary as JSON instead of the text block
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Migrate clients into owners
    Owners {
        /// Target tenant id
        tenant_id: String,
        /// Rows per insert batch
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },
    /// Migrate patients and their owner links (run after owners)
    Patients {
        /// Target tenant id
        tenant_id: String,
        /// Rows per insert batch
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },
    /// Migrate staff into users
    Users {
        /// Target tenant id
        tenant_id: String,
        /// Rows per insert batch
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },
}

/// Store locations, read from the environment.
struct Config {
    source_db: String,
    target_db: String,
}

impl Config {
    fn from_env() -> Result<Self> {
        let source_db = std::env::var("VETMIGRATE_SOURCE_DB")
            .context("VETMIGRATE_SOURCE_DB must point at the legacy store")?;
        let target_db = std::env::var("VETMIGRATE_TARGET_DB")
            .context("VETMIGRATE_TARGET_DB must point at the target store")?;
        Ok(Self {
            source_db,
            target_db,
        })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    tracing::info!(
        source = %config.source_db,
        target = %config.target_db,
        "starting migration run"
    );

    let source = SourceDb::open(&config.source_db)
        .with_context(|| format!("opening legacy store at {}", config.source_db))?;
    let target = TargetDb::open(&config.target_db)
        .with_context(|| format!("opening target store at {}", config.target_db))?;

    let summary = match cli.command {
        Command::Owners {
            tenant_id,
            batch_size,
        } => MigrationContext::new(source, target, &tenant_id, batch_size)?.migrate_owners()?,
        Command::Patients {
            tenant_id,
            batch_size,
        } => MigrationContext::new(source, target, &tenant_id, batch_size)?.migrate_patients()?,
        Command::Users {
            tenant_id,
            batch_size,
        } => MigrationContext::new(source, target, &tenant_id, batch_size)?.migrate_users()?,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
    }
    report(&summary)
}

fn report(summary: &MigrationSummary) -> Result<()> {
    if !summary.is_conserved() {
        bail!(
            "accounting mismatch for {}: {} of {} source rows accounted for",
            summary.entity,
            summary.accounted(),
            summary.total
        );
    }
    Ok(())
}
