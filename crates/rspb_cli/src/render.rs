//! Terminal rendering of status cards and history lists.

use rspb_core::history::HistoryEntry;
use rspb_core::status::{Panel, Status, StatusState, StatusView};

/// One line per card; `--json` emits one JSON object per line instead.
pub(crate) fn format_card(panel: Panel, status: &Status, json: bool) -> String {
    if json {
        return serde_json::json!({
            "panel": panel,
            "state": status.state,
            "label": status.label,
            "message": status.message,
        })
        .to_string();
    }
    match status.state {
        StatusState::Working => format!("[{}] {}", status.label, status.message),
        StatusState::Success | StatusState::Failed => {
            format!("{}: {}", status.label, status.message.trim_end())
        }
    }
}

pub(crate) fn format_history(entries: &[HistoryEntry], json: bool) -> Vec<String> {
    if json {
        return entries
            .iter()
            .map(|entry| serde_json::json!(entry).to_string())
            .collect();
    }
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| match entry.fill.key.as_deref() {
            Some(key) => format!("{:>3}. {}  (key: {})", index + 1, entry.label, key),
            None => format!("{:>3}. {}", index + 1, entry.label),
        })
        .collect()
}

/// Prints cards as they change: progress and failures to stderr, results to
/// stdout. History lists are printed only for `list_panel`.
pub(crate) struct TerminalView {
    json: bool,
    list_panel: Option<Panel>,
    last_state: Option<StatusState>,
}

impl TerminalView {
    pub(crate) fn new(json: bool) -> Self {
        Self {
            json,
            list_panel: None,
            last_state: None,
        }
    }

    /// Print the history list rendered for `panel`.
    pub(crate) fn list(&mut self, panel: Panel) {
        self.list_panel = Some(panel);
    }

    /// Whether the most recent card ended in failure.
    pub(crate) fn failed(&self) -> bool {
        self.last_state == Some(StatusState::Failed)
    }
}

impl StatusView for TerminalView {
    fn update_card(&mut self, panel: Panel, status: &Status) {
        self.last_state = Some(status.state);
        let line = format_card(panel, status, self.json);
        match status.state {
            StatusState::Success => println!("{}", line),
            StatusState::Working | StatusState::Failed => eprintln!("{}", line),
        }
    }

    fn show_history(&mut self, panel: Panel, entries: &[HistoryEntry]) {
        if self.list_panel != Some(panel) {
            return;
        }
        if entries.is_empty() && !self.json {
            println!("No pastes in local history.");
            return;
        }
        for line in format_history(entries, self.json) {
            println!("{}", line);
        }
    }
}
