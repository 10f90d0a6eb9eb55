//! Data models for cached records and API responses.

/// Cached paste records and server-provided paste metadata.
pub mod paste;
/// Response envelope and operation outcomes.
pub mod response;


pub use paste::{PasteInfo, PasteRecord};
pub use response::{interpret_response, Outcome, ResponseEnvelope};
