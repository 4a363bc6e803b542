pub mod credentials;
pub mod file_store;
pub mod store;

pub use credentials::{CredentialStore, FAVORITES_LIMIT, RECENT_LIMIT};
pub use file_store::FileStore;
pub use store::{KeyValueStore, StoreError};
