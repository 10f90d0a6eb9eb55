//! Status cards shown while an operation runs, and the hooks that render them.

use crate::history::HistoryEntry;
use crate::models::PasteInfo;
use chrono::{DateTime, Local, Utc};
use serde::Serialize;

/// The form a card or history list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    Create,
    View,
    Modify,
    Delete,
}

impl Panel {
    /// Panels that list the local history.
    pub const HISTORY_PANELS: [Panel; 3] = [Panel::Modify, Panel::View, Panel::Delete];

    /// Whether the panel's form has a modify-key field.
    pub fn has_key_field(self) -> bool {
        matches!(self, Panel::Modify | Panel::Delete)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Panel::Create => "create",
            Panel::View => "view",
            Panel::Modify => "modify",
            Panel::Delete => "delete",
        }
    }
}

/// Lifecycle state of an operation. Exactly one is shown at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Working,
    Success,
    Failed,
}

/// Visual treatment of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardTone {
    Working,
    Success,
    Warning,
}

impl CardTone {
    /// Style class applied to the card container.
    pub fn class(self) -> &'static str {
        match self {
            CardTone::Working => "card text-white bg-secondary mb-3 status-card",
            CardTone::Success => "card text-white bg-success mb-3 status-card",
            CardTone::Warning => "card text-black bg-warning mb-3 status-card",
        }
    }
}

/// Content of a status card: a short state label and a message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub state: StatusState,
    pub label: String,
    pub message: String,
}

const HANG_TIGHT: &str = "Hang tight...";

pub(crate) fn local_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

impl Status {
    fn new(state: StatusState, label: &str, message: impl Into<String>) -> Self {
        Self {
            state,
            label: label.to_string(),
            message: message.into(),
        }
    }

    /// Create request in flight.
    pub fn uploading() -> Self {
        Self::new(StatusState::Working, "Uploading", HANG_TIGHT)
    }

    /// Modify/delete request in flight.
    pub fn working() -> Self {
        Self::new(StatusState::Working, "Working", HANG_TIGHT)
    }

    /// Local validation failure; nothing was sent.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(StatusState::Failed, "Warning", message)
    }

    /// Server-reported or transport failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(StatusState::Failed, "Failed", message)
    }

    pub fn created(info: &PasteInfo) -> Self {
        let mut message = format!("Paste ID: {}, modify key: {}. ", info.id, info.key);
        if let Some(expire_time) = info.expire_time {
            message.push_str(&format!("Paste will expire at {}.", local_time(expire_time)));
        }
        Self::new(StatusState::Success, "Success", message)
    }

    pub fn updated() -> Self {
        Self::new(StatusState::Success, "Success", "Paste has been updated.")
    }

    pub fn deleted() -> Self {
        Self::new(StatusState::Success, "Success", "Paste has been deleted.")
    }

    /// Tone derived from the state; validation warnings and failures share one.
    pub fn tone(&self) -> CardTone {
        match self.state {
            StatusState::Working => CardTone::Working,
            StatusState::Success => CardTone::Success,
            StatusState::Failed => CardTone::Warning,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state != StatusState::Working
    }
}

/// UI hooks called back by the paste operations.
pub trait StatusView {
    /// Replace the card of `panel` with `status`.
    fn update_card(&mut self, panel: Panel, status: &Status);

    /// Re-populate the history list of `panel`.
    fn show_history(&mut self, panel: Panel, entries: &[HistoryEntry]);
}
