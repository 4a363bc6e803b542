pub mod profile;
pub mod series;

pub use profile::{Profile, Quota};
pub use series::{Observation, SearchResult, StoredKey};
