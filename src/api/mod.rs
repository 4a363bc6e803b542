pub mod client;
pub mod error;

pub use client::{HttpSeriesClient, SeriesApi};
pub use error::ApiError;
