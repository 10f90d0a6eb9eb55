//! Persistence port for the history slot and its implementations.

use crate::constants::HISTORY_SLOT;
use crate::error::AppError;
use crate::models::PasteRecord;
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Whole-collection persistence for cached paste records.
///
/// Every store operation loads and saves the full sequence; there are no
/// per-record updates.
pub trait HistoryStorage {
    /// Load the persisted sequence, `None` when the slot has never been written.
    fn load(&self) -> Result<Option<Vec<PasteRecord>>, AppError>;

    /// Replace the persisted sequence.
    fn save(&mut self, records: &[PasteRecord]) -> Result<(), AppError>;
}

impl<S: HistoryStorage + ?Sized> HistoryStorage for Box<S> {
    fn load(&self) -> Result<Option<Vec<PasteRecord>>, AppError> {
        (**self).load()
    }

    fn save(&mut self, records: &[PasteRecord]) -> Result<(), AppError> {
        (**self).save(records)
    }
}

/// In-memory slot, used by tests and by runs with history disabled.
#[derive(Debug, Default, Clone)]
pub struct MemoryHistory {
    slot: Option<Vec<PasteRecord>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already-populated slot.
    pub fn with_records(records: Vec<PasteRecord>) -> Self {
        Self {
            slot: Some(records),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.is_some()
    }
}

impl HistoryStorage for MemoryHistory {
    fn load(&self) -> Result<Option<Vec<PasteRecord>>, AppError> {
        Ok(self.slot.clone())
    }

    fn save(&mut self, records: &[PasteRecord]) -> Result<(), AppError> {
        self.slot = Some(records.to_vec());
        Ok(())
    }
}

/// History slot kept in a JSON object file (`{"pastes": [...]}`).
///
/// Other top-level keys in the file are preserved on save. Writes go to a
/// sibling temporary file that is renamed over the original.
#[derive(Debug, Clone)]
pub struct JsonFileHistory {
    path: PathBuf,
}

impl JsonFileHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_slots(&self) -> Result<Option<Map<String, Value>>, AppError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(AppError::StorageMessage(format!(
                    "Failed to read history file '{}': {}",
                    self.path.display(),
                    err
                )))
            }
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl HistoryStorage for JsonFileHistory {
    fn load(&self) -> Result<Option<Vec<PasteRecord>>, AppError> {
        let Some(mut slots) = self.read_slots()? else {
            return Ok(None);
        };
        match slots.remove(HISTORY_SLOT) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    fn save(&mut self, records: &[PasteRecord]) -> Result<(), AppError> {
        let mut slots = self.read_slots()?.unwrap_or_default();
        slots.insert(HISTORY_SLOT.to_string(), serde_json::to_value(records)?);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| {
                AppError::StorageMessage(format!(
                    "Failed to create history directory '{}': {}",
                    parent.display(),
                    err
                ))
            })?;
        }

        let temp_path = self.temp_path();
        fs::write(&temp_path, serde_json::to_vec_pretty(&slots)?)?;
        fs::rename(&temp_path, &self.path).map_err(|err| {
            AppError::StorageMessage(format!(
                "Failed to replace history file '{}': {}",
                self.path.display(),
                err
            ))
        })?;
        tracing::debug!(
            "Saved {} history record(s) to {:?}",
            records.len(),
            self.path
        );
        Ok(())
    }
}
