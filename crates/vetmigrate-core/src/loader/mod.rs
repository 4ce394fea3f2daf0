//! Batch Loader: idempotent, checkpoint-aware bulk writes.
//!
//! Writes go in bounded-size batches, each a single multi-row INSERT
//! inside its own transaction. A failed batch rolls back and aborts the
//! run; batches already committed stay committed, and the next run's
//! skip-set (lineage ids scanned from the target at start) makes the
//! rerun pick up exactly where the failure left off. There is no
//! checkpoint file; the target store itself is the checkpoint.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Transaction};
use std::collections::HashSet;

use crate::db::{DbResult, TargetDb};
use crate::models::{NewOwner, NewPatient, NewUser, OwnerLink};

/// Default batch size when the operator does not override it.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// A row that can participate in multi-row set-based inserts.
pub trait BulkRow {
    /// Target table name.
    const TABLE: &'static str;
    /// Insert column list, in bind order.
    const COLUMNS: &'static [&'static str];

    /// Lineage id used for duplicate skipping; `None` for rows (links)
    /// that are only ever staged alongside a freshly inserted parent.
    fn lineage_id(&self) -> Option<i64>;

    /// Push this row's values in `COLUMNS` order.
    fn bind(&self, out: &mut Vec<Value>);
}

impl BulkRow for NewOwner {
    const TABLE: &'static str = "owners";
    const COLUMNS: &'static [&'static str] = &[
        "id", "tenant_id", "branch_id", "name", "phone", "email", "address", "legacy_id",
    ];

    fn lineage_id(&self) -> Option<i64> {
        Some(self.legacy_id)
    }

    fn bind(&self, out: &mut Vec<Value>) {
        out.push(Value::from(self.id.clone()));
        out.push(Value::from(self.tenant_id.clone()));
        out.push(opt_text(self.branch_id.clone()));
        out.push(Value::from(self.name.clone()));
        out.push(Value::from(self.phone.clone()));
        out.push(opt_text(self.email.clone()));
        out.push(opt_text(self.address.clone()));
        out.push(Value::from(self.legacy_id));
    }
}

impl BulkRow for NewPatient {
    const TABLE: &'static str = "patients";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "tenant_id",
        "branch_id",
        "name",
        "species",
        "breed",
        "sex",
        "birth_date",
        "microchip",
        "notes",
        "legacy_id",
    ];

    fn lineage_id(&self) -> Option<i64> {
        Some(self.legacy_id)
    }

    fn bind(&self, out: &mut Vec<Value>) {
        out.push(Value::from(self.id.clone()));
        out.push(Value::from(self.tenant_id.clone()));
        out.push(opt_text(self.branch_id.clone()));
        out.push(Value::from(self.name.clone()));
        out.push(Value::from(self.species.as_str().to_string()));
        out.push(opt_text(self.breed.clone()));
        out.push(Value::from(self.sex.as_str().to_string()));
        out.push(opt_text(self.birth_date.map(|d| d.to_string())));
        out.push(opt_text(self.microchip.clone()));
        out.push(opt_text(self.notes.clone()));
        out.push(Value::from(self.legacy_id));
    }
}

impl BulkRow for OwnerLink {
    const TABLE: &'static str = "patient_owners";
    const COLUMNS: &'static [&'static str] = &["id", "patient_id", "owner_id", "is_primary"];

    fn lineage_id(&self) -> Option<i64> {
        None
    }

    fn bind(&self, out: &mut Vec<Value>) {
        out.push(Value::from(self.id.clone()));
        out.push(Value::from(self.patient_id.clone()));
        out.push(Value::from(self.owner_id.clone()));
        out.push(Value::from(self.is_primary));
    }
}

impl BulkRow for NewUser {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "tenant_id",
        "branch_id",
        "username",
        "full_name",
        "role",
        "phone",
        "email",
        "department",
        "legacy_id",
    ];

    fn lineage_id(&self) -> Option<i64> {
        Some(self.legacy_id)
    }

    fn bind(&self, out: &mut Vec<Value>) {
        out.push(Value::from(self.id.clone()));
        out.push(Value::from(self.tenant_id.clone()));
        out.push(opt_text(self.branch_id.clone()));
        out.push(Value::from(self.username.clone()));
        out.push(Value::from(self.full_name.clone()));
        out.push(Value::from(self.role.as_str().to_string()));
        out.push(opt_text(self.phone.clone()));
        out.push(opt_text(self.email.clone()));
        out.push(opt_text(self.department.clone()));
        out.push(Value::from(self.legacy_id));
    }
}

fn opt_text(value: Option<String>) -> Value {
    match value {
        Some(text) => Value::Text(text),
        None => Value::Null,
    }
}

/// Bounded-batch writer into the target store.
pub struct BatchLoader {
    batch_size: usize,
}

impl BatchLoader {
    /// Create a loader; a zero batch size is clamped to 1.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// Split staged rows into new rows and already-migrated duplicates.
    pub fn partition_new<T: BulkRow>(rows: Vec<T>, existing: &HashSet<i64>) -> (Vec<T>, usize) {
        let before = rows.len();
        let new_rows: Vec<T> = rows
            .into_iter()
            .filter(|row| match row.lineage_id() {
                Some(id) => !existing.contains(&id),
                None => true,
            })
            .collect();
        let skipped = before - new_rows.len();
        (new_rows, skipped)
    }

    /// Insert rows in batches, one transaction per batch, one set-based
    /// statement per table per batch. Prints the per-batch progress line.
    pub fn load<T: BulkRow>(&self, db: &mut TargetDb, rows: &[T]) -> DbResult<usize> {
        let total = rows.len();
        let mut written = 0;

        for chunk in rows.chunks(self.batch_size) {
            let tx = db.transaction()?;
            insert_chunk(&tx, chunk)?;
            tx.commit()?;

            written += chunk.len();
            tracing::debug!(table = T::TABLE, written, total, "batch committed");
            println!("migrated {written} / {total}");
        }

        Ok(written)
    }

    /// Insert patients together with their owner links, both sides of a
    /// batch inside the same transaction. A kill between batches can
    /// therefore never leave a committed patient without links.
    pub fn load_patients(
        &self,
        db: &mut TargetDb,
        staged: &[(NewPatient, Vec<OwnerLink>)],
    ) -> DbResult<usize> {
        let total = staged.len();
        let mut written = 0;

        for chunk in staged.chunks(self.batch_size) {
            let patients: Vec<&NewPatient> = chunk.iter().map(|(p, _)| p).collect();
            let links: Vec<&OwnerLink> = chunk.iter().flat_map(|(_, l)| l).collect();

            let tx = db.transaction()?;
            insert_chunk_refs(&tx, &patients)?;
            insert_chunk_refs(&tx, &links)?;
            tx.commit()?;

            written += chunk.len();
            tracing::debug!(written, total, links = links.len(), "patient batch committed");
            println!("migrated {written} / {total}");
        }

        Ok(written)
    }
}

impl Default for BatchLoader {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

fn insert_chunk<T: BulkRow>(tx: &Transaction<'_>, chunk: &[T]) -> DbResult<()> {
    let refs: Vec<&T> = chunk.iter().collect();
    insert_chunk_refs(tx, &refs)
}

fn insert_chunk_refs<T: BulkRow>(tx: &Transaction<'_>, chunk: &[&T]) -> DbResult<()> {
    if chunk.is_empty() {
        return Ok(());
    }

    let row_placeholder = format!(
        "({})",
        std::iter::repeat("?")
            .take(T::COLUMNS.len())
            .collect::<Vec<_>>()
            .join(", ")
    );
    let placeholders = std::iter::repeat(row_placeholder.as_str())
        .take(chunk.len())
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        "INSERT INTO {} ({}) VALUES {}",
        T::TABLE,
        T::COLUMNS.join(", "),
        placeholders
    );

    let mut params: Vec<Value> = Vec::with_capacity(chunk.len() * T::COLUMNS.len());
    for row in chunk {
        row.bind(&mut params);
    }

    tx.execute(&sql, params_from_iter(params))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Sex, Species};

    fn setup_db() -> TargetDb {
        let db = TargetDb::open_in_memory().unwrap();
        db.insert_tenant("t1", "Clinic", "clinic").unwrap();
        db
    }

    fn owner(legacy_id: i64) -> NewOwner {
        NewOwner {
            id: uuid::Uuid::new_v4().to_string(),
            tenant_id: "t1".to_string(),
            branch_id: None,
            name: format!("Owner {legacy_id}"),
            phone: format!("+7999000{legacy_id:04}"),
            email: None,
            address: None,
            legacy_id,
        }
    }

    fn patient(legacy_id: i64) -> NewPatient {
        NewPatient {
            id: uuid::Uuid::new_v4().to_string(),
            tenant_id: "t1".to_string(),
            branch_id: None,
            name: format!("Patient {legacy_id}"),
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
    fn test_load_owners_in_batches() {
        let mut db = setup_db();
        let rows: Vec<NewOwner> = (1..=7).map(owner).collect();

        let loader = BatchLoader::new(3);
        let written = loader.load(&mut db, &rows).unwrap();

        assert_eq!(written, 7);
        assert_eq!(db.count_owners_with_lineage("t1").unwrap(), 7);
    }

    #[test]
    fn test_partition_new_skips_existing() {
        let existing: HashSet<i64> = [1, 3].into_iter().collect();
        let rows: Vec<NewOwner> = (1..=4).map(owner).collect();

        let (new_rows, skipped) = BatchLoader::partition_new(rows, &existing);
        assert_eq!(skipped, 2);
        let ids: Vec<i64> = new_rows.iter().map(|o| o.legacy_id).collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn test_load_patients_with_links_same_tx() {
        let mut db = setup_db();
        let o = owner(1);
        db.insert_owner(&o).unwrap();

        let p1 = patient(10);
        let p2 = patient(11);
        let staged = vec![
            (p1.clone(), vec![OwnerLink::new(&p1.id, &o.id, true)]),
            (p2.clone(), vec![OwnerLink::new(&p2.id, &o.id, true)]),
        ];

        let loader = BatchLoader::new(1);
        let written = loader.load_patients(&mut db, &staged).unwrap();

        assert_eq!(written, 2);
        assert_eq!(db.count_patients_with_lineage("t1").unwrap(), 2);
        assert_eq!(db.count_linked_patients("t1").unwrap(), 2);
    }

    #[test]
    fn test_batch_failure_keeps_committed_batches() {
        let mut db = setup_db();
        let loader = BatchLoader::new(2);

        // Second batch violates the lineage unique index (duplicate 3)
        let rows = vec![owner(1), owner(2), owner(3), owner(3)];
        let result = loader.load(&mut db, &rows);

        assert!(result.is_err());
        // First batch stayed committed; the failed batch rolled back whole
        assert_eq!(db.count_owners_with_lineage("t1").unwrap(), 2);
    }

    #[test]
    fn test_zero_rows_is_noop() {
        let mut db = setup_db();
        let loader = BatchLoader::default();
        let written = loader.load::<NewOwner>(&mut db, &[]).unwrap();
        assert_eq!(written, 0);
    }
}
