//! DataSetIQ spreadsheet bridge.
//!
//! Connects an account by API key, searches the series catalog and writes
//! `DSIQ` formulas into the host spreadsheet, keeping favorite and recently
//! used series in the host's key/value store.

pub mod api;
pub mod commands;
pub mod config;
pub mod models;
pub mod normalize;
pub mod session;
pub mod sheet;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;
