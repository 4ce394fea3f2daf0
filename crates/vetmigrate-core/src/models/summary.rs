//! Per-run migration statistics.

use serde::Serialize;
use std::fmt;

/// Counters for a single entity-type migration run.
///
/// Every source record lands in exactly one bucket, so
/// `created + skipped_duplicate + skipped_no_match + skipped_invalid +
/// collisions + errors == total` holds for every run (the conservation
/// property). Re-running against an unchanged source moves everything that
/// was `created` into `skipped_duplicate` and changes nothing else.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct MigrationSummary {
    /// Entity type this run migrated ("owners", "patients", "users")
    pub entity: String,
    /// Total rows read from the legacy store
    pub total: usize,
    /// Rows inserted into the target store
    pub created: usize,
    /// Rows whose lineage id was already present (expected on re-run)
    pub skipped_duplicate: usize,
    /// Patients with no resolvable owner (never created without a link)
    pub skipped_no_match: usize,
    /// Rows failing validation (e.g. no usable name)
    pub skipped_invalid: usize,
    /// Identity-collision losers (the first-seen record won)
    pub collisions: usize,
    /// Per-record failures surfaced during the run
    pub errors: usize,
}

impl MigrationSummary {
    /// Start a summary for an entity run.
    pub fn new(entity: &str, total: usize) -> Self {
        Self {
            entity: entity.to_string(),
            total,
            ..Self::default()
        }
    }

    /// Sum of all outcome buckets.
    pub fn accounted(&self) -> usize {
        self.created
            + self.skipped_duplicate
            + self.skipped_no_match
            + self.skipped_invalid
            + self.collisions
            + self.errors
    }

    /// Conservation check: every source record is accounted for.
    pub fn is_conserved(&self) -> bool {
        self.accounted() == self.total
    }
}

impl fmt::Display for MigrationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== migration results: {} ===", self.entity)?;
        writeln!(f, "created:            {}", self.created)?;
        writeln!(f, "skipped duplicate:  {}", self.skipped_duplicate)?;
        writeln!(f, "skipped no match:   {}", self.skipped_no_match)?;
        writeln!(f, "skipped invalid:    {}", self.skipped_invalid)?;
        writeln!(f, "collisions:         {}", self.collisions)?;
        writeln!(f, "errors:             {}", self.errors)?;
        write!(f, "total source rows:  {}", self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conservation() {
        let mut summary = MigrationSummary::new("owners", 10);
        summary.created = 6;
        summary.skipped_duplicate = 2;
        summary.collisions = 1;
        assert!(!summary.is_conserved());

        summary.skipped_invalid = 1;
        assert!(summary.is_conserved());
    }

    #[test]
    fn test_display_contains_counters() {
        let mut summary = MigrationSummary::new("patients", 3);
        summary.created = 2;
        summary.skipped_no_match = 1;
        let text = summary.to_string();
        assert!(text.contains("migration results: patients"));
        assert!(text.contains("created:            2"));
        assert!(text.contains("skipped no match:   1"));
    }
}
