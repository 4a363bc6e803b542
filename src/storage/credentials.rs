use super::store::{KeyValueStore, StoreError};
use crate::models::StoredKey;
use std::sync::Arc;

const API_KEY_ITEM: &str = "DATASETIQ_API_KEY";
const FAVORITES_ITEM: &str = "DATASETIQ_FAVORITES";
const RECENT_ITEM: &str = "DATASETIQ_RECENT";

pub const FAVORITES_LIMIT: usize = 50;
pub const RECENT_LIMIT: usize = 20;

/// API key plus the favorites and recent series lists, kept in the host store.
///
/// `store: None` models a host without any persistent store.
#[derive(Clone)]
pub struct CredentialStore {
    store: Option<Arc<dyn KeyValueStore>>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store: Some(store) }
    }

    pub fn unsupported() -> Self {
        Self { store: None }
    }

    pub fn is_supported(&self) -> bool {
        self.store.is_some()
    }

    /// Read the API key. Never fails: a store error reads as "unsupported".
    pub async fn get_stored_api_key(&self) -> StoredKey {
        let Some(store) = &self.store else {
            return StoredKey::unsupported();
        };
        match store.get_item(API_KEY_ITEM).await {
            Ok(key) => StoredKey::supported(key),
            Err(e) => {
                tracing::warn!("Failed to read API key from {}: {}", store.name(), e);
                StoredKey::unsupported()
            }
        }
    }

    pub async fn set_stored_api_key(&self, key: &str) -> Result<(), StoreError> {
        let store = self.store.as_ref().ok_or(StoreError::Unavailable)?;
        store.set_item(API_KEY_ITEM, key).await?;
        tracing::info!("API key saved ({})", mask_key(key));
        Ok(())
    }

    /// Best effort; errors are logged and dropped
    pub async fn clear_stored_api_key(&self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.remove_item(API_KEY_ITEM).await {
            tracing::warn!("Failed to clear API key: {}", e);
        }
    }

    pub async fn get_favorites(&self) -> Vec<String> {
        self.read_list(FAVORITES_ITEM).await
    }

    pub async fn get_recent(&self) -> Vec<String> {
        self.read_list(RECENT_ITEM).await
    }

    /// Put `id` at the front of favorites unless it is already there
    pub async fn add_favorite(&self, id: &str) -> Result<(), StoreError> {
        let mut favorites = self.get_favorites().await;
        if favorites.iter().any(|f| f == id) {
            return Ok(());
        }
        favorites.insert(0, id.to_string());
        favorites.truncate(FAVORITES_LIMIT);
        self.write_list(FAVORITES_ITEM, &favorites).await
    }

    pub async fn remove_favorite(&self, id: &str) -> Result<(), StoreError> {
        let mut favorites = self.get_favorites().await;
        let before = favorites.len();
        favorites.retain(|f| f != id);
        if favorites.len() == before {
            return Ok(());
        }
        self.write_list(FAVORITES_ITEM, &favorites).await
    }

    /// Move (or insert) `id` to the front of the recent list
    pub async fn add_recent(&self, id: &str) -> Result<(), StoreError> {
        let mut recent = self.get_recent().await;
        recent.retain(|r| r != id);
        recent.insert(0, id.to_string());
        recent.truncate(RECENT_LIMIT);
        self.write_list(RECENT_ITEM, &recent).await
    }

    async fn read_list(&self, item: &str) -> Vec<String> {
        let Some(store) = &self.store else {
            return Vec::new();
        };
        let raw = match store.get_item(item).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", item, e);
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!("Ignoring malformed {}: {}", item, e);
                Vec::new()
            }
        }
    }

    async fn write_list(&self, item: &str, list: &[String]) -> Result<(), StoreError> {
        let store = self.store.as_ref().ok_or(StoreError::Unavailable)?;
        let json = serde_json::to_string(list).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        store.set_item(item, &json).await
    }
}

/// Show only the first four characters of a secret
pub fn mask_key(key: &str) -> String {
    let prefix: String = key.chars().take(4).collect();
    format!("{}…", prefix)
}
