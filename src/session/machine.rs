//! Session orchestration: store, remote API and spreadsheet host behind one
//! state value.
//!
//! The state lock is never held across an await on a collaborator. Profile
//! fetches and searches stamp a generation before suspending and drop their
//! result if a newer action bumped it in the meantime.

use super::state::{
    SessionState, SessionView, Tab, CONNECTED_MESSAGE, CONNECTING_MESSAGE, CONNECT_FAILED,
    CONNECT_PROMPT, DISCONNECTED_MESSAGE, FAVORITES_FAILED, INSERT_FAILED, KEY_REQUIRED,
    RECENT_FAILED, SAVE_FAILED, UNSUPPORTED_MESSAGE,
};
use crate::api::{ApiError, SeriesApi};
use crate::normalize::{build_array_result, non_empty_trimmed, DateInput, NormalizeError};
use crate::sheet::{self, FormulaKind, SpreadsheetHost};
use crate::storage::CredentialStore;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Date(#[from] NormalizeError),
}

#[derive(Clone)]
pub struct Session {
    state: Arc<RwLock<SessionState>>,
    credentials: CredentialStore,
    api: Arc<dyn SeriesApi>,
    host: Arc<dyn SpreadsheetHost>,
}

impl Session {
    pub fn new(
        credentials: CredentialStore,
        api: Arc<dyn SeriesApi>,
        host: Arc<dyn SpreadsheetHost>,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState::default())),
            credentials,
            api,
            host,
        }
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn view(&self) -> SessionView {
        self.state.read().await.view.clone()
    }

    /// Startup: storage support, then stored key, then key validity
    pub async fn bootstrap(&self) {
        let stored = self.credentials.get_stored_api_key().await;

        // Lists load even without key storage; they degrade to empty
        self.refresh_lists().await;

        if !stored.supported {
            self.state
                .write()
                .await
                .transition(SessionView::Unsupported, UNSUPPORTED_MESSAGE);
            return;
        }

        match non_empty_trimmed(stored.key.as_deref()) {
            Some(key) => {
                let generation = self.next_profile_generation().await;
                self.load_profile(&key, generation).await
            }
            None => self
                .state
                .write()
                .await
                .transition(SessionView::Disconnected, CONNECT_PROMPT),
        }
    }

    async fn next_profile_generation(&self) -> u64 {
        let mut state = self.state.write().await;
        state.profile_generation += 1;
        state.profile_generation
    }

    /// Enter `loading`, fetch the profile, land in `connected` or `disconnected`.
    /// Does nothing once `generation` is stale.
    async fn load_profile(&self, key: &str, generation: u64) {
        {
            let mut state = self.state.write().await;
            if state.profile_generation != generation {
                tracing::debug!("Skipping profile fetch (generation {} superseded)", generation);
                return;
            }
            state.transition(SessionView::Loading, CONNECTING_MESSAGE);
        }

        let outcome = self.api.fetch_profile(key).await;

        let mut state = self.state.write().await;
        if state.profile_generation != generation {
            tracing::debug!("Discarding stale profile response (generation {})", generation);
            return;
        }
        match outcome {
            Ok(profile) => state.transition(SessionView::Connected { profile }, CONNECTED_MESSAGE),
            Err(e) => {
                tracing::warn!("Profile fetch failed: {}", e);
                let message = e.user_message().unwrap_or_else(|| CONNECT_FAILED.to_string());
                state.transition(SessionView::Disconnected, message);
            }
        }
    }

    /// Track the key entry box
    pub async fn set_api_key_input(&self, input: &str) {
        self.state.write().await.api_key_input = input.to_string();
    }

    /// Persist a new key and connect with it
    pub async fn save_api_key(&self, input: &str) {
        let Some(key) = non_empty_trimmed(Some(input)) else {
            self.state.write().await.message = KEY_REQUIRED.to_string();
            return;
        };

        // Stamped before the store write so a disconnect during it wins
        let generation = self.next_profile_generation().await;
        let saved = self.credentials.set_stored_api_key(&key).await;

        let mut state = self.state.write().await;
        if state.profile_generation != generation {
            tracing::debug!("Discarding superseded key save (generation {})", generation);
            return;
        }
        if let Err(e) = saved {
            tracing::error!("Failed to save API key: {}", e);
            let message = Some(e.to_string())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| SAVE_FAILED.to_string());
            state.transition(SessionView::Unsupported, message);
            return;
        }
        state.api_key_input.clear();
        drop(state);

        self.load_profile(&key, generation).await;
    }

    /// Forget the key. Always ends in `disconnected`.
    pub async fn disconnect(&self) {
        self.credentials.clear_stored_api_key().await;

        let mut state = self.state.write().await;
        // Invalidate any profile fetch or search still in flight
        state.profile_generation += 1;
        state.search_generation += 1;
        state.results.clear();
        state.transition(SessionView::Disconnected, DISCONNECTED_MESSAGE);
    }

    /// Search the catalog with the key currently in the store
    pub async fn search(&self, query: &str) {
        let (generation, query) = {
            let mut state = self.state.write().await;
            if !state.view.is_connected() {
                tracing::debug!("Ignoring search while {}", state.view);
                return;
            }
            state.search_query = query.to_string();
            state.search_generation += 1;

            match non_empty_trimmed(Some(query)) {
                Some(query) => (state.search_generation, query),
                None => {
                    state.results.clear();
                    return;
                }
            }
        };

        let key = self.credentials.get_stored_api_key().await.key;
        let outcome = self.api.search_series(key.as_deref(), &query).await;

        let mut state = self.state.write().await;
        if state.search_generation != generation || !state.view.is_connected() {
            tracing::debug!("Discarding stale results for {:?}", query);
            return;
        }
        match outcome {
            Ok(results) => state.results = results,
            Err(e) => {
                tracing::warn!("Search {:?} failed: {}", query, e);
                state.results.clear();
                state.message = format!("Search failed: {}", e);
            }
        }
    }

    pub async fn set_tab(&self, tab: Tab) {
        self.state.write().await.active_tab = tab;
    }

    pub async fn is_favorite(&self, id: &str) -> bool {
        self.state.read().await.is_favorite(id)
    }

    pub async fn toggle_favorite(&self, id: &str) {
        let favorites = self.credentials.get_favorites().await;
        let result = if favorites.iter().any(|f| f == id) {
            self.credentials.remove_favorite(id).await
        } else {
            self.credentials.add_favorite(id).await
        };
        self.refresh_lists().await;
        if let Err(e) = result {
            tracing::warn!("Failed to update favorites for {}: {}", id, e);
            self.state.write().await.message = format!("{}: {}", FAVORITES_FAILED, e);
        }
    }

    /// Write a formula into the host selection. Connection state is untouched.
    pub async fn insert_formula(&self, series_id: &str, kind: &FormulaKind) {
        match sheet::insert_formula(self.host.as_ref(), &self.credentials, series_id, kind).await {
            Ok(inserted) => {
                self.refresh_lists().await;
                let message = match inserted.recent_error {
                    Some(e) => format!("{}. {}: {}", inserted.summary, RECENT_FAILED, e),
                    None => inserted.summary,
                };
                self.state.write().await.message = message;
            }
            Err(e) => {
                let message = Some(e.to_string())
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| INSERT_FAILED.to_string());
                self.state.write().await.message = message;
            }
        }
    }

    /// Fetch a series and shape it the way `DSIQ` spills it
    pub async fn preview(&self, series_id: &str) -> Result<Vec<Vec<Value>>, PreviewError> {
        let key = self.credentials.get_stored_api_key().await.key;
        let observations = self.api.fetch_observations(key.as_deref(), series_id).await?;

        let rows = observations
            .iter()
            .map(|o| Ok((DateInput::try_from(&o.date)?, o.value.clone())))
            .collect::<Result<Vec<_>, NormalizeError>>()?;
        Ok(build_array_result(&rows)?)
    }

    async fn refresh_lists(&self) {
        let favorites = self.credentials.get_favorites().await;
        let recent = self.credentials.get_recent().await;

        let mut state = self.state.write().await;
        state.favorites = favorites;
        state.recent = recent;
    }
}
