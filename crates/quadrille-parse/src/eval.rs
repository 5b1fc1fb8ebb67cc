//! Evaluation of expression trees against an injected cell lookup.
//!
//! The parser knows nothing about sheets; the engine supplies a closure
//! resolving a [`Position`] to a number (or to an error value, which
//! propagates unchanged). Arithmetic is plain `f64` with two hard rules:
//! dividing by zero and producing a non-finite result both yield `#DIV/0!`.

use quadrille_common::{FormulaError, FormulaErrorKind, Position};

use crate::parser::{ASTNode, ASTNodeType};

/// Map a non-finite result (overflow, 0/0) to `#DIV/0!`.
pub(crate) fn sanitize_numeric(value: f64) -> Result<f64, FormulaError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FormulaError::new(FormulaErrorKind::Div))
    }
}

impl ASTNode {
    /// Evaluate the expression. Errors are carried as values by the caller;
    /// the `Err` arm here is the propagation channel, not a failure of the
    /// evaluation machinery.
    pub fn evaluate<F>(&self, lookup: &F) -> Result<f64, FormulaError>
    where
        F: Fn(Position) -> Result<f64, FormulaError>,
    {
        match &self.node_type {
            ASTNodeType::Literal(value) => Ok(*value),
            ASTNodeType::Reference { position, .. } => {
                if !position.is_valid() {
                    return Err(FormulaError::new(FormulaErrorKind::Ref));
                }
                lookup(*position)
            }
            ASTNodeType::UnaryOp { op, expr } => {
                let value = expr.evaluate(lookup)?;
                match op.as_str() {
                    "-" => sanitize_numeric(-value),
                    _ => sanitize_numeric(value),
                }
            }
            ASTNodeType::BinaryOp { op, left, right } => {
                let lhs = left.evaluate(lookup)?;
                let rhs = right.evaluate(lookup)?;
                match op.as_str() {
                    "+" => sanitize_numeric(lhs + rhs),
                    "-" => sanitize_numeric(lhs - rhs),
                    "*" => sanitize_numeric(lhs * rhs),
                    _ => {
                        if rhs == 0.0 {
                            return Err(FormulaError::new(FormulaErrorKind::Div));
                        }
                        sanitize_numeric(lhs / rhs)
                    }
                }
            }
        }
    }
}
