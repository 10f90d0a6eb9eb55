//! Local history of pastes created from this device.
//!
//! The store is a cache, never the authority on whether a paste exists: the
//! service is. Records enter only through [`HistoryStore::add`] after a
//! successful create and leave through [`HistoryStore::remove`] after a
//! successful delete or through lazy expiry in [`HistoryStore::purge_expired`].
//!
//! Every operation rewrites the whole collection. Two writers racing on the
//! same backing slot can lose updates, and creating the same id twice appends
//! a second record instead of merging.

/// Time source abstraction.
pub mod clock;
/// Persistence port and backends.
pub mod storage;


pub use clock::{Clock, FixedClock, SystemClock};
pub use storage::{HistoryStorage, JsonFileHistory, MemoryHistory};

use crate::error::AppError;
use crate::models::{PasteInfo, PasteRecord};
use crate::status::{local_time, Panel};
use serde::Serialize;

/// Values a history entry writes into a form when selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormFill {
    pub id: String,
    /// Only filled for panels with a key field.
    pub key: Option<String>,
}

/// One row of a rendered history list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub label: String,
    pub fill: FormFill,
}

impl HistoryEntry {
    fn for_panel(record: &PasteRecord, panel: Panel) -> Self {
        Self {
            label: format!("{} created on {}", record.id, local_time(record.create_time)),
            fill: FormFill {
                id: record.id.clone(),
                key: panel.has_key_field().then(|| record.key.clone()),
            },
        }
    }
}

/// Paste history over an injected storage port and clock.
pub struct HistoryStore<S, C = SystemClock> {
    storage: S,
    clock: C,
}

impl<S: HistoryStorage> HistoryStore<S> {
    /// Create a store stamped by the wall clock.
    pub fn new(storage: S) -> Self {
        Self::with_clock(storage, SystemClock)
    }
}

impl<S: HistoryStorage, C: Clock> HistoryStore<S, C> {
    pub fn with_clock(storage: S, clock: C) -> Self {
        Self { storage, clock }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Return every cached record in insertion order.
    ///
    /// Never fails: an absent slot is initialized to an empty sequence, and an
    /// unreadable one is logged and reported as empty.
    pub fn list_all(&mut self) -> Vec<PasteRecord> {
        match self.storage.load() {
            Ok(Some(records)) => records,
            Ok(None) => {
                if let Err(err) = self.storage.save(&[]) {
                    tracing::warn!("Failed to initialize paste history: {}", err);
                }
                Vec::new()
            }
            Err(err) => {
                tracing::warn!("Failed to read paste history: {}", err);
                Vec::new()
            }
        }
    }

    fn load_for_update(&self) -> Result<Vec<PasteRecord>, AppError> {
        Ok(self.storage.load()?.unwrap_or_default())
    }

    /// Append a record stamped with the current time.
    ///
    /// # Errors
    /// Returns an error when the collection cannot be read or written.
    pub fn add(&mut self, info: PasteInfo) -> Result<PasteRecord, AppError> {
        let mut records = self.load_for_update()?;
        let record = PasteRecord::from_info(info, self.clock.now());
        records.push(record.clone());
        self.storage.save(&records)?;
        tracing::info!("Cached paste {} in history", record.id);
        Ok(record)
    }

    /// Drop every record whose expire time is strictly before now.
    ///
    /// # Returns
    /// Number of records removed.
    ///
    /// # Errors
    /// Returns an error when the collection cannot be read or written.
    pub fn purge_expired(&mut self) -> Result<usize, AppError> {
        let now = self.clock.now();
        let records = self.load_for_update()?;
        let before = records.len();
        let kept: Vec<PasteRecord> = records
            .into_iter()
            .filter(|record| !record.is_expired_at(now))
            .collect();
        let removed = before - kept.len();
        self.storage.save(&kept)?;
        if removed > 0 {
            tracing::debug!("Purged {} expired paste(s) from history", removed);
        }
        Ok(removed)
    }

    /// Drop every record with `id`; unknown ids are a no-op.
    ///
    /// # Returns
    /// Number of records removed.
    ///
    /// # Errors
    /// Returns an error when the collection cannot be read or written.
    pub fn remove(&mut self, id: &str) -> Result<usize, AppError> {
        let records = self.load_for_update()?;
        let before = records.len();
        let kept: Vec<PasteRecord> = records.into_iter().filter(|record| record.id != id).collect();
        let removed = before - kept.len();
        self.storage.save(&kept)?;
        tracing::debug!("Removed {} history record(s) for paste {}", removed, id);
        Ok(removed)
    }

    /// Purge expired records, then build the rows of `panel`'s history list.
    pub fn listing(&mut self, panel: Panel) -> Vec<HistoryEntry> {
        if let Err(err) = self.purge_expired() {
            tracing::warn!("Failed to purge expired pastes: {}", err);
        }
        self.list_all()
            .iter()
            .map(|record| HistoryEntry::for_panel(record, panel))
            .collect()
    }

    /// Selection action for `id` on `panel`, using the most recent unexpired
    /// record.
    pub fn fill_for(&mut self, panel: Panel, id: &str) -> Option<FormFill> {
        if let Err(err) = self.purge_expired() {
            tracing::warn!("Failed to purge expired pastes: {}", err);
        }
        self.list_all()
            .iter()
            .rev()
            .find(|record| record.id == id)
            .map(|record| HistoryEntry::for_panel(record, panel).fill)
    }
}
