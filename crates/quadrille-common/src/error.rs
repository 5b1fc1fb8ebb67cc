//! Evaluation-error values carried through formula results.
//!
//! - **`FormulaErrorKind`** : the canonical error codes (`#REF!`, …)
//! - **`FormulaError`**     : kind plus an optional human explanation
//!
//! These are *values*, not failures: evaluation returns them inside
//! [`CellValue`](crate::CellValue) and arithmetic propagates them. Structural
//! failures (invalid position, syntax, cycles) live with the engine API.

use std::{error::Error, fmt};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The error codes a formula can evaluate to.
///
/// Names are CamelCase (idiomatic Rust) while `Display` renders the
/// spreadsheet tokens (`#DIV/0!`, …).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FormulaErrorKind {
    /// Reference to a position outside the valid grid.
    Ref,
    /// Arithmetic over text that does not parse as a number.
    Value,
    /// Division by zero, or a result that is not finite.
    Div,
}

impl fmt::Display for FormulaErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ref => "#REF!",
            Self::Value => "#VALUE!",
            Self::Div => "#DIV/0!",
        })
    }
}

impl FormulaErrorKind {
    /// Inverse of `Display`; `None` for anything that is not a known token.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "#REF!" => Some(Self::Ref),
            "#VALUE!" => Some(Self::Value),
            "#DIV/0!" => Some(Self::Div),
            _ => None,
        }
    }
}

/// The single error value the evaluator passes around.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FormulaError {
    pub kind: FormulaErrorKind,
    pub message: Option<String>,
}

impl From<FormulaErrorKind> for FormulaError {
    fn from(kind: FormulaErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }
}

impl FormulaError {
    /// Basic constructor (no message).
    pub fn new(kind: FormulaErrorKind) -> Self {
        kind.into()
    }

    /// Attach a human-readable explanation.
    pub fn with_message<S: Into<String>>(mut self, msg: S) -> Self {
        self.message = Some(msg.into());
        self
    }

    pub fn kind(&self) -> FormulaErrorKind {
        self.kind
    }
}

impl fmt::Display for FormulaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(ref msg) = self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl Error for FormulaError {}

impl PartialEq<str> for FormulaError {
    fn eq(&self, other: &str) -> bool {
        self.kind.to_string() == other
    }
}
