//! Quadrille dependency-tracking spreadsheet engine.
//!
//! A [`Sheet`] owns every [`Cell`] in an append-only arena; cells hold
//! [`CellContent`] (empty, text, or a parsed formula with a memoized result)
//! plus the two edge sets of the dependency graph. Edits keep the graph
//! acyclic and drop exactly the caches the edit can influence.

pub mod cell;
pub mod error;
pub mod sheet;

pub use cell::{Cell, CellContent, CellId, FormulaCell, ESCAPE_SIGN, FORMULA_SIGN};
pub use error::SheetError;
pub use sheet::Sheet;
