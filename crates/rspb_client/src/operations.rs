//! The four paste operations, each driving validate, build, transmit and
//! interpret, then rendering the terminal card and updating the history.
//!
//! Operations are independent: nothing orders two in-flight requests, and
//! whichever response arrives last decides the local history state.

use crate::api::PasteClient;
use crate::error::ClientError;
use reqwest::Url;
use rspb_core::error::ValidationError;
use rspb_core::forms::{
    build_create, build_delete, build_modify, view_path, CreateForm, DeleteForm, ModifyForm,
    ViewForm,
};
use rspb_core::history::{Clock, HistoryStorage, HistoryStore, SystemClock};
use rspb_core::models::Outcome;
use rspb_core::status::{Panel, Status, StatusView};

const MISSING_INFO: &str = "response missing paste info";

/// Paste operations bound to one client, history and set of UI hooks.
pub struct PasteOperations<S, V, C = SystemClock> {
    client: PasteClient,
    history: HistoryStore<S, C>,
    ui: V,
}

impl<S, V, C> PasteOperations<S, V, C>
where
    S: HistoryStorage,
    V: StatusView,
    C: Clock,
{
    pub fn new(client: PasteClient, history: HistoryStore<S, C>, ui: V) -> Self {
        Self {
            client,
            history,
            ui,
        }
    }

    pub fn client(&self) -> &PasteClient {
        &self.client
    }

    pub fn history(&mut self) -> &mut HistoryStore<S, C> {
        &mut self.history
    }

    pub fn ui(&self) -> &V {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut V {
        &mut self.ui
    }

    pub fn into_ui(self) -> V {
        self.ui
    }

    fn reject_locally(&mut self, panel: Panel, err: ValidationError) -> ValidationError {
        tracing::debug!("{} form rejected: {}", panel.as_str(), err);
        self.ui.update_card(panel, &Status::warning(err.to_string()));
        err
    }

    fn render_failure(&mut self, panel: Panel, outcome: &Outcome) {
        let message = outcome.failure_message().unwrap_or_default();
        self.ui.update_card(panel, &Status::failed(message));
    }

    /// Re-render the history list of every panel that shows one.
    pub fn refresh_history(&mut self) {
        for panel in Panel::HISTORY_PANELS {
            let entries = self.history.listing(panel);
            self.ui.show_history(panel, &entries);
        }
    }

    /// Upload a new paste and cache its id and key on success.
    ///
    /// # Returns
    /// The network outcome; a success without paste info is reported as a
    /// transport failure.
    ///
    /// # Errors
    /// Validation failures, rendered as a warning before any request is made.
    pub async fn create(&mut self, form: &CreateForm) -> Result<Outcome, ValidationError> {
        let request = build_create(form).map_err(|err| self.reject_locally(Panel::Create, err))?;
        self.ui.update_card(Panel::Create, &Status::uploading());

        let outcome = match self.client.send(&request).await {
            Outcome::Success { info: None } => Outcome::TransportFailed {
                error: MISSING_INFO.to_string(),
            },
            outcome => outcome,
        };
        let Outcome::Success { info: Some(info) } = &outcome else {
            self.render_failure(Panel::Create, &outcome);
            return Ok(outcome);
        };

        self.ui.update_card(Panel::Create, &Status::created(info));
        tracing::info!("Created paste {}", info.id);
        if let Err(err) = self.history.add(info.clone()) {
            tracing::warn!("Failed to cache paste {} in history: {}", info.id, err);
        }
        self.refresh_history();
        Ok(outcome)
    }

    /// Navigation target for viewing a paste; no request is made.
    ///
    /// # Errors
    /// A blank id (rendered as a warning) or an unusable server URL.
    pub fn view(&mut self, form: &ViewForm) -> Result<Url, ClientError> {
        let path = view_path(form).map_err(|err| self.reject_locally(Panel::View, err))?;
        Ok(self.client.url_for(&path)?)
    }

    /// Replace content and/or metadata of an existing paste.
    ///
    /// # Errors
    /// Validation failures, rendered as a warning before any request is made.
    pub async fn modify(&mut self, form: &ModifyForm) -> Result<Outcome, ValidationError> {
        let request = build_modify(form).map_err(|err| self.reject_locally(Panel::Modify, err))?;
        self.ui.update_card(Panel::Modify, &Status::working());

        let outcome = self.client.send(&request).await;
        if outcome.is_success() {
            tracing::info!("Updated paste {}", request.display_path());
            self.ui.update_card(Panel::Modify, &Status::updated());
        } else {
            self.render_failure(Panel::Modify, &outcome);
        }
        Ok(outcome)
    }

    /// Delete a paste and forget it locally on success.
    ///
    /// # Errors
    /// Validation failures, rendered as a warning before any request is made.
    pub async fn delete(&mut self, form: &DeleteForm) -> Result<Outcome, ValidationError> {
        let request = build_delete(form).map_err(|err| self.reject_locally(Panel::Delete, err))?;
        self.ui.update_card(Panel::Delete, &Status::working());

        let outcome = self.client.send(&request).await;
        if !outcome.is_success() {
            self.render_failure(Panel::Delete, &outcome);
            return Ok(outcome);
        }

        self.ui.update_card(Panel::Delete, &Status::deleted());
        let id = &request.path[0];
        tracing::info!("Deleted paste {}", id);
        if let Err(err) = self.history.remove(id) {
            tracing::warn!("Failed to drop paste {} from history: {}", id, err);
        }
        self.refresh_history();
        Ok(outcome)
    }
}
