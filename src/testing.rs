//! In-memory stand-ins for the host store, the remote API and the spreadsheet.

use crate::api::{ApiError, SeriesApi};
use crate::models::{Observation, Profile, Quota, SearchResult};
use crate::sheet::{HostError, SpreadsheetHost};
use crate::storage::{KeyValueStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
    set_delay: Mutex<Option<Duration>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Slow down `set_item` only; removals stay immediate
    pub fn delay_sets(&self, delay: Duration) {
        *self.set_delay.lock().unwrap() = Some(delay);
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn io_error() -> StoreError {
        StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "store offline"))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::io_error());
        }
        Ok(self.items.lock().unwrap().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let delay = *self.set_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::io_error());
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.items.lock().unwrap().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::io_error());
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.items.lock().unwrap().remove(key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "MemoryStore"
    }
}

pub fn sample_profile(email: &str) -> Profile {
    Profile {
        email: email.to_string(),
        plan: "pro".to_string(),
        status: "active".to_string(),
        quota: Quota {
            used: 10.0,
            limit: 1000.0,
            reset: "2024-02-01".to_string(),
        },
    }
}

/// Scripted remote API. Keys without a scripted profile are rejected with 401.
#[derive(Default)]
pub struct FakeApi {
    profiles: Mutex<HashMap<String, Result<Profile, ApiError>>>,
    searches: Mutex<HashMap<String, Result<Vec<SearchResult>, ApiError>>>,
    observations: Mutex<HashMap<String, Vec<Observation>>>,
    delays: Mutex<HashMap<String, Duration>>,
    search_keys: Mutex<Vec<Option<String>>>,
    profile_calls: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(self, key: &str, profile: Result<Profile, ApiError>) -> Self {
        self.profiles.lock().unwrap().insert(key.to_string(), profile);
        self
    }

    pub fn with_search(self, query: &str, results: Result<Vec<SearchResult>, ApiError>) -> Self {
        self.searches.lock().unwrap().insert(query.to_string(), results);
        self
    }

    pub fn with_observations(self, id: &str, data: Vec<Observation>) -> Self {
        self.observations.lock().unwrap().insert(id.to_string(), data);
        self
    }

    /// Delay responses for a key or query (applies to both)
    pub fn with_delay(self, key_or_query: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(key_or_query.to_string(), delay);
        self
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    pub fn search_keys(&self) -> Vec<Option<String>> {
        self.search_keys.lock().unwrap().clone()
    }

    async fn pause(&self, what: &str) {
        let delay = self.delays.lock().unwrap().get(what).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl SeriesApi for FakeApi {
    async fn fetch_profile(&self, key: &str) -> Result<Profile, ApiError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.pause(key).await;
        self.profiles.lock().unwrap().get(key).cloned().unwrap_or_else(|| {
            Err(ApiError::Http {
                status: 401,
                message: "Invalid API key".to_string(),
            })
        })
    }

    async fn search_series(&self, key: Option<&str>, query: &str) -> Result<Vec<SearchResult>, ApiError> {
        self.search_keys.lock().unwrap().push(key.map(str::to_string));
        self.pause(query).await;
        self.searches
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_observations(&self, _key: Option<&str>, series_id: &str) -> Result<Vec<Observation>, ApiError> {
        self.observations
            .lock()
            .unwrap()
            .get(series_id)
            .cloned()
            .ok_or_else(|| ApiError::Http {
                status: 404,
                message: format!("Unknown series {}", series_id),
            })
    }
}

/// Records written formulas, or rejects every write with a fixed message
#[derive(Default)]
pub struct FakeHost {
    written: Mutex<Vec<String>>,
    failure: Option<String>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            written: Mutex::new(Vec::new()),
            failure: Some(message.to_string()),
        }
    }

    pub fn written(&self) -> Vec<String> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpreadsheetHost for FakeHost {
    async fn write_formula_to_selection(&self, formula: &str) -> Result<String, HostError> {
        if let Some(message) = &self.failure {
            return Err(HostError::Rejected(message.clone()));
        }
        self.written.lock().unwrap().push(formula.to_string());
        Ok("A1".to_string())
    }

    fn name(&self) -> &'static str {
        "FakeHost"
    }
}

pub fn result(id: &str, title: &str) -> SearchResult {
    SearchResult {
        id: id.to_string(),
        title: title.to_string(),
    }
}
