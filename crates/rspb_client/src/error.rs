//! Errors surfaced by client construction and raw fetches.
//!
//! Paste operations never return these: their failures are rendered and
//! reported as [`rspb_core::models::Outcome`] values.
use rspb_core::error::{AppError, ValidationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    App(#[from] AppError),

    #[error("Request failed with HTTP {code}: {reason}")]
    Status { code: u16, reason: String },
}

impl From<ValidationError> for ClientError {
    fn from(value: ValidationError) -> Self {
        Self::App(value.into())
    }
}
