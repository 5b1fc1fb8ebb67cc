//! The value a cell presents to formulas and to rendering.

use std::{
    fmt::{self, Display},
    hash::{Hash, Hasher},
};

use crate::FormulaError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Evaluated cell value. Distinct from the content stored in a cell: an
/// empty cell *presents* `Number(0.0)`, an escaped text cell presents the
/// text without its escape sign, a formula cell presents its result.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Error(FormulaError),
}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            CellValue::Number(n) => n.to_bits().hash(state),
            CellValue::Text(s) => s.hash(state),
            CellValue::Error(e) => e.hash(state),
        }
    }
}

impl Eq for CellValue {}

impl Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Error(e) => write!(f, "{}", e.kind),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<FormulaError> for CellValue {
    fn from(error: FormulaError) -> Self {
        CellValue::Error(error)
    }
}

impl CellValue {
    /// Numeric view, without coercion.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }
}
