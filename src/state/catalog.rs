use chrono::{DateTime, Utc};
use std::collections::HashMap;
use super::data::CatalogRecord;
use super::entry::{EntryHandle, EntryId};

/// The CatalogStore holds the downloaded records and the entries revealed
/// from them so far.
///
/// Records are revealed strictly in source order, one at a time. Removing
/// an entry does not give its record back nor move the cursor, so the
/// highest revealed index only ever grows.
#[derive(Debug, Default)]
pub struct CatalogStore {
    records: Vec<CatalogRecord>,
    revealed_count: usize,
    entries: HashMap<EntryId, EntryHandle>,
    loaded_at: Option<DateTime<Utc>>,
}

impl CatalogStore {
    /// Create an empty store, nothing downloaded yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole record list.
    ///
    /// Starts over: entries revealed from the previous list are released
    /// and the reveal cursor goes back to the first record.
    pub fn load(&mut self, records: Vec<CatalogRecord>) {
        for entry in self.entries.values_mut() {
            entry.dispose();
        }
        self.entries.clear();
        self.revealed_count = 0;
        self.records = records;
        self.loaded_at = Some(Utc::now());
    }

    /// Next unrevealed record, advancing the cursor
    pub fn reveal_next(&mut self) -> Option<CatalogRecord> {
        let record = self.records.get(self.revealed_count)?.clone();
        self.revealed_count += 1;
        Some(record)
    }

    /// True while `reveal_next` still has something to give
    pub fn has_unrevealed(&self) -> bool {
        self.revealed_count < self.records.len()
    }

    /// Number of records revealed so far, removed entries included
    pub fn revealed_count(&self) -> usize {
        self.revealed_count
    }

    /// Highest 1-based index ever revealed
    pub fn max_revealed_index(&self) -> i32 {
        i32::try_from(self.revealed_count).unwrap_or(i32::MAX)
    }

    /// Size of the downloaded catalog
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// When the current record list was loaded
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    /// Register an entry. Gives it back if its id is already active.
    pub fn insert(&mut self, entry: EntryHandle) -> Result<(), EntryHandle> {
        if self.entries.contains_key(entry.id()) {
            return Err(entry);
        }
        self.entries.insert(entry.id().to_string(), entry);
        Ok(())
    }

    /// Forget the entry for `id` and release its resources
    pub fn remove(&mut self, id: &str) -> bool {
        match self.entries.remove(id) {
            Some(mut entry) => {
                entry.dispose();
                true
            }
            None => false,
        }
    }

    /// Active entry for `id`
    pub fn get(&self, id: &str) -> Option<&EntryHandle> {
        self.entries.get(id)
    }

    /// Active entry for `id`, mutable
    pub fn get_mut(&mut self, id: &str) -> Option<&mut EntryHandle> {
        self.entries.get_mut(id)
    }

    /// Whether `id` maps to an active entry
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of active entries
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Active entries in reveal order
    pub fn entries(&self) -> Vec<&EntryHandle> {
        let mut entries: Vec<&EntryHandle> = self.entries.values().collect();
        entries.sort_by_key(|e| e.slot());
        entries
    }
}
