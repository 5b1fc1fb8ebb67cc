//! Rejected edits must leave values, texts, graph behavior and caches
//! exactly as they were.

use quadrille_common::{CellValue, Position};
use quadrille_engine::{CellContent, Sheet, SheetError};

fn pos(a1: &str) -> Position {
    Position::from_a1(a1).unwrap()
}

fn cached(sheet: &Sheet, a1: &str) -> Option<f64> {
    match sheet
        .get_cell(pos(a1))
        .unwrap()
        .expect("cell present")
        .content()
    {
        CellContent::Formula(fc) => fc.cached(),
        _ => None,
    }
}

#[test]
fn syntax_error_leaves_the_old_value_in_place() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("A1"), "=1+1").unwrap();
    assert_eq!(sheet.value(pos("A1")).unwrap(), CellValue::Number(2.0));

    assert!(matches!(
        sheet.set_cell(pos("A1"), "=1+"),
        Err(SheetError::FormulaSyntax(_))
    ));
    assert_eq!(sheet.text(pos("A1")).unwrap(), "=1+1");
    assert_eq!(sheet.value(pos("A1")).unwrap(), CellValue::Number(2.0));
    // The memoized result survived the failed edit.
    assert_eq!(cached(&sheet, "A1"), Some(2.0));
}

#[test]
fn rejected_cycle_keeps_the_previous_formula() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("B1"), "7").unwrap();
    sheet.set_cell(pos("A1"), "=B1").unwrap();
    sheet.set_cell(pos("C1"), "=A1").unwrap();
    assert_eq!(sheet.value(pos("C1")).unwrap(), CellValue::Number(7.0));

    // A1 <- C1 would close A1 -> C1 -> A1.
    assert_eq!(
        sheet.set_cell(pos("A1"), "=C1"),
        Err(SheetError::CircularDependency)
    );
    assert_eq!(sheet.text(pos("A1")).unwrap(), "=B1");
    assert_eq!(sheet.value(pos("A1")).unwrap(), CellValue::Number(7.0));
    assert_eq!(cached(&sheet, "C1"), Some(7.0));

    // The old edges still drive invalidation correctly.
    sheet.set_cell(pos("B1"), "9").unwrap();
    assert_eq!(sheet.value(pos("C1")).unwrap(), CellValue::Number(9.0));
}

#[test]
fn longer_cycles_are_caught() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("A1"), "=B1").unwrap();
    sheet.set_cell(pos("B1"), "=C1").unwrap();
    assert_eq!(
        sheet.set_cell(pos("C1"), "=A1"),
        Err(SheetError::CircularDependency)
    );
    assert_eq!(sheet.text(pos("C1")).unwrap(), "");
    assert_eq!(sheet.value(pos("A1")).unwrap(), CellValue::Number(0.0));
}

#[test]
fn cycle_through_a_diamond_is_caught() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("B1"), "=A1").unwrap();
    sheet.set_cell(pos("B2"), "=A1").unwrap();
    sheet.set_cell(pos("C1"), "=B1+B2").unwrap();
    assert_eq!(
        sheet.set_cell(pos("A1"), "=C1"),
        Err(SheetError::CircularDependency)
    );
    assert_eq!(sheet.text(pos("A1")).unwrap(), "");
}

#[test]
fn replacing_a_formula_may_legally_reverse_an_edge() {
    // A1 -> B1 replaced by B1 -> A1 is fine once A1 no longer reads B1.
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("A1"), "=B1").unwrap();
    sheet.set_cell(pos("A1"), "5").unwrap();
    sheet.set_cell(pos("B1"), "=A1").unwrap();
    assert_eq!(sheet.value(pos("B1")).unwrap(), CellValue::Number(5.0));
}

#[test]
fn failed_edit_does_not_disturb_the_printable_rectangle() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("A1"), "1").unwrap();
    assert_eq!(sheet.printable_size(), (1, 1));

    // The rejected formula references far-away cells; materialization must
    // not widen the printable rectangle.
    assert_eq!(
        sheet.set_cell(pos("A1"), "=A1+ZZ999"),
        Err(SheetError::CircularDependency)
    );
    assert_eq!(sheet.printable_size(), (1, 1));
    assert_eq!(sheet.text(pos("A1")).unwrap(), "1");
}

#[test]
fn invalid_position_reports_before_any_parsing() {
    let mut sheet = Sheet::new();
    assert_eq!(
        sheet.set_cell(Position::INVALID, "=definitely not a formula"),
        Err(SheetError::InvalidPosition)
    );
}
