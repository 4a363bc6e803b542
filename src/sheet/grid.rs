//! In-process worksheet used when the bridge runs outside a spreadsheet
//! application. Cells are addressed A1-style and hold formula text only.

use super::host::{HostError, SpreadsheetHost};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tokio::sync::RwLock;

/// Zero-based cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl FromStr for CellRef {
    type Err = HostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let addr = s.trim().to_ascii_uppercase();
        let invalid = || HostError::InvalidAddress(s.trim().to_string());

        let split = addr.find(|c: char| c.is_ascii_digit()).ok_or_else(invalid)?;
        let (letters, digits) = addr.split_at(split);
        if letters.is_empty() || letters.len() > 3 || !letters.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(invalid());
        }

        let col = letters
            .bytes()
            .fold(0u32, |acc, b| acc * 26 + u32::from(b - b'A' + 1));
        let row: u32 = digits.parse().map_err(|_| invalid())?;
        if row == 0 {
            return Err(invalid());
        }

        Ok(CellRef { row: row - 1, col: col - 1 })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut letters = Vec::new();
        let mut n = self.col + 1;
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push((b'A' + rem as u8) as char);
            n = (n - 1) / 26;
        }
        let col: String = letters.into_iter().rev().collect();
        write!(f, "{}{}", col, self.row + 1)
    }
}

struct GridState {
    cells: BTreeMap<CellRef, String>,
    selection: Option<CellRef>,
}

pub struct GridSheet {
    state: RwLock<GridState>,
}

impl GridSheet {
    /// Empty sheet with A1 selected
    pub fn new() -> Self {
        Self {
            state: RwLock::new(GridState {
                cells: BTreeMap::new(),
                selection: Some(CellRef { row: 0, col: 0 }),
            }),
        }
    }

    pub async fn select(&self, address: &str) -> Result<CellRef, HostError> {
        let cell: CellRef = address.parse()?;
        self.state.write().await.selection = Some(cell);
        Ok(cell)
    }

    pub async fn clear_selection(&self) {
        self.state.write().await.selection = None;
    }

    pub async fn selection(&self) -> Option<CellRef> {
        self.state.read().await.selection
    }

    #[cfg(test)]
    pub async fn formula_at(&self, address: &str) -> Option<String> {
        let cell: CellRef = address.parse().ok()?;
        self.state.read().await.cells.get(&cell).cloned()
    }

    /// Non-empty cells in row-major order
    pub async fn cells(&self) -> Vec<(String, String)> {
        self.state
            .read()
            .await
            .cells
            .iter()
            .map(|(cell, formula)| (cell.to_string(), formula.clone()))
            .collect()
    }
}

impl Default for GridSheet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpreadsheetHost for GridSheet {
    async fn write_formula_to_selection(&self, formula: &str) -> Result<String, HostError> {
        let mut state = self.state.write().await;
        let cell = state.selection.ok_or(HostError::NoSelection)?;
        state.cells.insert(cell, formula.to_string());
        Ok(cell.to_string())
    }

    fn name(&self) -> &'static str {
        "GridSheet"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_addresses() {
        assert_eq!("A1".parse::<CellRef>().unwrap(), CellRef { row: 0, col: 0 });
        assert_eq!("b12".parse::<CellRef>().unwrap(), CellRef { row: 11, col: 1 });
        assert_eq!("AA3".parse::<CellRef>().unwrap(), CellRef { row: 2, col: 26 });
        assert!("A0".parse::<CellRef>().is_err());
        assert!("12".parse::<CellRef>().is_err());
        assert!("A1B".parse::<CellRef>().is_err());
        assert!("ABCD1".parse::<CellRef>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for addr in ["A1", "Z9", "AA10", "AZ1", "BA2", "XFD1048576"] {
            assert_eq!(addr.parse::<CellRef>().unwrap().to_string(), addr);
        }
    }

    #[tokio::test]
    async fn test_write_to_selection() {
        let sheet = GridSheet::new();
        assert_eq!(sheet.write_formula_to_selection("=DSIQ(\"A\")").await.unwrap(), "A1");

        sheet.select("c4").await.unwrap();
        assert_eq!(sheet.write_formula_to_selection("=DSIQ(\"B\")").await.unwrap(), "C4");

        assert_eq!(sheet.formula_at("C4").await.as_deref(), Some("=DSIQ(\"B\")"));
        assert_eq!(sheet.cells().await.len(), 2);
    }

    #[tokio::test]
    async fn test_no_selection() {
        let sheet = GridSheet::new();
        sheet.clear_selection().await;
        assert_eq!(
            sheet.write_formula_to_selection("=1").await,
            Err(HostError::NoSelection)
        );
        assert!(sheet.select("?").await.is_err());
        assert_eq!(sheet.selection().await, None);
    }
}
