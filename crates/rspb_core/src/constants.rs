//! Shared constants used across rspb crates.

/// Default base URL for the paste service.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Name of the slot holding cached paste records.
pub const HISTORY_SLOT: &str = "pastes";

/// File name of the persisted history under the cache directory.
pub const HISTORY_FILE_NAME: &str = "history.json";

/// Request header carrying the modify key.
pub const KEY_HEADER: &str = "Key";

/// Multipart field carrying paste content (inline text or file upload).
pub const CONTENT_FIELD: &str = "content";

/// Multipart field carrying the display name.
pub const NAME_FIELD: &str = "name";

/// Multipart field carrying the expire-after quantity in minutes.
pub const EXPIRE_AFTER_FIELD: &str = "expire_after";
