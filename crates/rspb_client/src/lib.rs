//! HTTP client and operation lifecycle for the rspb paste service.

/// Transport: URL handling and multipart requests via reqwest.
pub mod api;
/// Client-side error type.
pub mod error;
/// Create/view/modify/delete lifecycle wired to history and status hooks.
pub mod operations;

pub use api::{api_url, normalize_server, PasteClient};
pub use error::ClientError;
pub use operations::PasteOperations;
