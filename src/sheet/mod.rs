pub mod formula;
pub mod grid;
pub mod host;

pub use formula::{build_formula, FormulaKind};
pub use grid::{CellRef, GridSheet};
pub use host::{insert_formula, HostError, Inserted, SpreadsheetHost};
