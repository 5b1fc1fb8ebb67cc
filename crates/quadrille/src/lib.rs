//! Meta crate that re-exports the Quadrille building blocks. Downstream
//! users can depend on this crate alone and keep access to the underlying
//! layers when deeper integration is required.

pub use quadrille_common as common;
pub use quadrille_engine as engine;
pub use quadrille_parse as parse;

pub use quadrille_common::{
    CellValue, FormulaError, FormulaErrorKind, Position, MAX_COLS, MAX_ROWS,
};
pub use quadrille_engine::{Cell, CellContent, Sheet, SheetError, ESCAPE_SIGN, FORMULA_SIGN};
pub use quadrille_parse::{parse_formula, Formula};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facade_wires_the_layers_together() {
        let mut sheet = Sheet::new();
        sheet.set_cell(Position::from_a1("A1").unwrap(), "21").unwrap();
        sheet
            .set_cell(Position::from_a1("A2").unwrap(), "=A1*2")
            .unwrap();
        assert_eq!(
            sheet.value(Position::from_a1("A2").unwrap()).unwrap(),
            CellValue::Number(42.0)
        );
    }
}
