//! Core domain library for rspb (history cache, form building, status model).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants used across rspb crates.
pub mod constants;
/// Process-global environment mutation helpers.
pub mod env;
/// Application error types (storage/validation).
pub mod error;
/// Form validation and request descriptors.
pub mod forms;
/// Local paste history cache and its storage port.
pub mod history;
/// Data models for cached records and API responses.
pub mod models;
/// Status-card model and UI hook traits.
pub mod status;

pub use config::Config;
pub use constants::*;
pub use error::AppError;
pub use history::HistoryStore;
