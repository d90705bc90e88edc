//! Diagnosis record persistence
//!
//! The lifecycle manager only needs load, insert, list and an atomic
//! compare-and-swap keyed on the record version. Anything that can offer
//! those (a database table, a key-value store) can back the manager.

use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::error::{Result, TriageError};
use crate::models::diagnosis::DiagnosisRecord;

/// Storage collaborator for diagnosis records
pub trait DiagnosisStore: Send + Sync {
    /// Reserve a fresh record identifier
    fn next_id(&self) -> u64;

    /// Store a new record
    ///
    /// # Errors
    /// Returns `ValidationError` if a record with the same id already exists
    fn insert(&self, record: DiagnosisRecord) -> Result<()>;

    /// Load a record by identifier
    ///
    /// # Errors
    /// Returns `RecordNotFound` for unknown identifiers
    fn load(&self, id: u64) -> Result<DiagnosisRecord>;

    /// Replace a record only if its stored version is still `expected_version`
    ///
    /// Returns `Ok(false)` when another writer got there first.
    fn compare_and_swap(&self, expected_version: u64, record: DiagnosisRecord) -> Result<bool>;

    /// All records, ordered by identifier
    fn list(&self) -> Vec<DiagnosisRecord>;
}

/// Process-local store backed by a hash map
#[derive(Debug)]
pub struct InMemoryDiagnosisStore {
    records: RwLock<FxHashMap<u64, DiagnosisRecord>>,
    next_id: AtomicU64,
}

impl Default for InMemoryDiagnosisStore {
    fn default() -> Self {
        Self {
            records: RwLock::new(FxHashMap::default()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl InMemoryDiagnosisStore {
    /// Create an empty store; identifiers start at 1
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosisStore for InMemoryDiagnosisStore {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn insert(&self, record: DiagnosisRecord) -> Result<()> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if records.contains_key(&record.id) {
            return Err(TriageError::validation(format!(
                "Diagnosis record {} already exists",
                record.id
            )));
        }
        records.insert(record.id, record);
        Ok(())
    }

    fn load(&self, id: u64) -> Result<DiagnosisRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(TriageError::RecordNotFound(id))
    }

    fn compare_and_swap(&self, expected_version: u64, record: DiagnosisRecord) -> Result<bool> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let current = records
            .get_mut(&record.id)
            .ok_or(TriageError::RecordNotFound(record.id))?;
        if current.version != expected_version {
            return Ok(false);
        }
        *current = record;
        Ok(true)
    }

    fn list(&self) -> Vec<DiagnosisRecord> {
        let mut records: Vec<_> = self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        records.sort_by_key(|r| r.id);
        records
    }
}
