//! Response envelope returned by the paste service and its interpretation.

use super::paste::PasteInfo;
use serde::Deserialize;

/// JSON body of every create/modify/delete response.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ResponseEnvelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub info: Option<PasteInfo>,
}

/// Terminal result of one network operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The service reported `success: true`.
    Success { info: Option<PasteInfo> },
    /// The service reported `success: false`; `message` is shown verbatim.
    Rejected { message: String },
    /// The request never produced a usable envelope.
    TransportFailed { error: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Human-readable failure reason, `None` on success.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Rejected { message } => Some(message),
            Self::TransportFailed { error } => Some(error),
        }
    }
}

fn status_text(code: u16, reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!("HTTP {} {}", code, reason),
        None => format!("HTTP {}", code),
    }
}

/// Interpret a response body.
///
/// A parsable envelope wins regardless of HTTP status, since the service
/// reports rejections as JSON with 4xx/5xx codes. An unparsable body is a
/// transport failure: on a 2xx status the parser error is reported, otherwise
/// the status line.
///
/// # Arguments
/// - `code`: HTTP status code.
/// - `reason`: Canonical reason phrase for `code`, when known.
/// - `body`: Raw response body.
pub fn interpret_response(code: u16, reason: Option<&str>, body: &str) -> Outcome {
    let envelope = match serde_json::from_str::<ResponseEnvelope>(body) {
        Ok(envelope) => envelope,
        Err(err) if (200..300).contains(&code) => {
            return Outcome::TransportFailed {
                error: format!("Malformed response: {}", err),
            };
        }
        Err(_) => {
            return Outcome::TransportFailed {
                error: status_text(code, reason),
            };
        }
    };

    if envelope.success {
        return Outcome::Success {
            info: envelope.info,
        };
    }

    let message = envelope
        .message
        .filter(|message| !message.trim().is_empty())
        .or_else(|| reason.map(str::to_string))
        .unwrap_or_else(|| "Request failed".to_string());
    Outcome::Rejected { message }
}
