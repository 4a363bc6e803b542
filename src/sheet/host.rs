use super::formula::{build_formula, FormulaKind};
use crate::storage::CredentialStore;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("No cell selected")]
    NoSelection,
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),
    #[error("{0}")]
    Rejected(String),
}

/// The spreadsheet application hosting the bridge
#[async_trait]
pub trait SpreadsheetHost: Send + Sync {
    /// Write `formula` into the currently selected cell and return its address
    async fn write_formula_to_selection(&self, formula: &str) -> Result<String, HostError>;

    /// Return the host name for logging purposes
    fn name(&self) -> &'static str;
}

/// A formula that made it into the sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inserted {
    pub address: String,
    pub formula: String,
    /// Status line: `Inserted DSIQ_LATEST("FRED-GDP")`
    pub summary: String,
    /// Set when the formula landed but the recent list could not be written
    pub recent_error: Option<String>,
}

/// Write the formula for `series_id` into the selection, then record the
/// series as recently used. A failed recent-list write does not fail the
/// insert; it is reported in `Inserted::recent_error`. Hosts without a store
/// skip the recent list.
pub async fn insert_formula(
    host: &dyn SpreadsheetHost,
    credentials: &CredentialStore,
    series_id: &str,
    kind: &FormulaKind,
) -> Result<Inserted, HostError> {
    let formula = build_formula(series_id, kind);
    let address = host.write_formula_to_selection(&formula).await.map_err(|e| {
        tracing::warn!("{} rejected {}: {}", host.name(), formula, e);
        e
    })?;
    tracing::info!("Inserted {} at {}", formula, address);

    let recent_error = if credentials.is_supported() {
        credentials.add_recent(series_id).await.err().map(|e| {
            tracing::warn!("Failed to record {} as recent: {}", series_id, e);
            e.to_string()
        })
    } else {
        None
    };

    Ok(Inserted {
        address,
        summary: format!("Inserted {}(\"{}\")", kind.function_name(), series_id),
        formula,
        recent_error,
    })
}
