use crate::models::{Profile, SearchResult};
use std::fmt;

pub const LOADING_MESSAGE: &str = "Loading...";
pub const CONNECTING_MESSAGE: &str = "Connecting...";
pub const CONNECTED_MESSAGE: &str = "Connected";
pub const CONNECT_PROMPT: &str = "Connect your account to unlock quota and entitlements.";
pub const UNSUPPORTED_MESSAGE: &str =
    "This host has no persistent storage. Open the bridge in a supported spreadsheet to connect.";
pub const CONNECT_FAILED: &str = "Unable to connect. Please re-enter your API key.";
pub const KEY_REQUIRED: &str = "API key required.";
pub const SAVE_FAILED: &str = "Unable to save key.";
pub const DISCONNECTED_MESSAGE: &str = "Disconnected. Enter your API key to reconnect.";
pub const INSERT_FAILED: &str = "Unable to insert formula";
pub const FAVORITES_FAILED: &str = "Unable to update favorites";
pub const RECENT_FAILED: &str = "Unable to update recent series";

/// Connection state. The profile only exists while connected.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionView {
    Loading,
    Connected { profile: Profile },
    Disconnected,
    Unsupported,
}

impl SessionView {
    pub fn name(&self) -> &'static str {
        match self {
            SessionView::Loading => "loading",
            SessionView::Connected { .. } => "connected",
            SessionView::Disconnected => "disconnected",
            SessionView::Unsupported => "unsupported",
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        match self {
            SessionView::Connected { profile } => Some(profile),
            _ => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, SessionView::Connected { .. })
    }

    /// The key entry form is shown in these states
    pub fn shows_connect_form(&self) -> bool {
        matches!(self, SessionView::Disconnected | SessionView::Unsupported)
    }
}

impl fmt::Display for SessionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Search,
    Favorites,
    Recent,
}

impl std::str::FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "search" => Ok(Tab::Search),
            "favorites" | "favourites" | "fav" => Ok(Tab::Favorites),
            "recent" => Ok(Tab::Recent),
            other => Err(format!("Unknown tab: {}", other)),
        }
    }
}

/// Everything the task pane renders
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub view: SessionView,
    /// Status line shown under the header
    pub message: String,
    pub api_key_input: String,
    pub search_query: String,
    pub results: Vec<SearchResult>,
    pub active_tab: Tab,
    /// Cached copies; the store holds the durable lists
    pub favorites: Vec<String>,
    pub recent: Vec<String>,
    pub(crate) profile_generation: u64,
    pub(crate) search_generation: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            view: SessionView::Loading,
            message: LOADING_MESSAGE.to_string(),
            api_key_input: String::new(),
            search_query: String::new(),
            results: Vec::new(),
            active_tab: Tab::default(),
            favorites: Vec::new(),
            recent: Vec::new(),
            profile_generation: 0,
            search_generation: 0,
        }
    }
}

impl SessionState {
    pub fn profile(&self) -> Option<&Profile> {
        self.view.profile()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.iter().any(|f| f == id)
    }

    /// Series listed under the active tab
    pub fn visible_ids(&self) -> Vec<String> {
        match self.active_tab {
            Tab::Search => self.results.iter().map(|r| r.id.clone()).collect(),
            Tab::Favorites => self.favorites.clone(),
            Tab::Recent => self.recent.clone(),
        }
    }

    pub(crate) fn transition(&mut self, view: SessionView, message: impl Into<String>) {
        let message = message.into();
        if self.view.name() != view.name() {
            tracing::info!("Session {} -> {}: {}", self.view, view, message);
        }
        self.view = view;
        self.message = message;
    }
}
