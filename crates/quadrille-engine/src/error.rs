//! Structural failures of the engine API.
//!
//! These abort the operation and leave the sheet untouched; they are
//! distinct from the evaluation errors (`#REF!` and friends) that travel as
//! values inside [`quadrille_common::CellValue`].

use std::error::Error;
use std::fmt;

use quadrille_parse::ParserError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    /// The position names no addressable cell.
    InvalidPosition,
    /// The edit text started with `=` but the remainder did not parse.
    FormulaSyntax(ParserError),
    /// The edit would make the dependency graph cyclic.
    CircularDependency,
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetError::InvalidPosition => write!(f, "position is outside the valid grid"),
            SheetError::FormulaSyntax(err) => write!(f, "formula does not parse: {err}"),
            SheetError::CircularDependency => {
                write!(f, "edit would create a circular dependency")
            }
        }
    }
}

impl Error for SheetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SheetError::FormulaSyntax(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParserError> for SheetError {
    fn from(err: ParserError) -> Self {
        SheetError::FormulaSyntax(err)
    }
}
