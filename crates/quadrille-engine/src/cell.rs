//! Cell state: the content variants and the graph bookkeeping around them.

use quadrille_common::{CellValue, Position};
use quadrille_parse::{parse_formula, Formula};
use rustc_hash::FxHashSet;

use crate::error::SheetError;
use crate::sheet::Sheet;

/// Leading character marking a formula edit.
pub const FORMULA_SIGN: char = '=';
/// Leading character protecting literal text from interpretation.
pub const ESCAPE_SIGN: char = '\'';

/// Engine-internal cell identity: an index into the sheet's append-only
/// arena. Growth never moves cells, so ids stay stable for the lifetime of
/// the sheet.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct CellId(u32);

impl CellId {
    pub(crate) fn new(id: u32) -> Self {
        Self(id)
    }

    pub(crate) fn as_index(self) -> usize {
        self.0 as usize
    }
}

/// A formula plus the memoized result of its last successful evaluation.
///
/// The cache sits behind `std::cell::Cell` so a logically-read-only
/// evaluation can fill it; only finite numbers are ever stored, errors are
/// recomputed on every read.
#[derive(Debug, Clone)]
pub struct FormulaCell {
    formula: Formula,
    cache: std::cell::Cell<Option<f64>>,
}

impl FormulaCell {
    fn new(formula: Formula) -> Self {
        Self {
            formula,
            cache: std::cell::Cell::new(None),
        }
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    pub fn cached(&self) -> Option<f64> {
        self.cache.get()
    }

    pub fn is_cache_valid(&self) -> bool {
        self.cache.get().is_some()
    }

    pub(crate) fn store_cache(&self, value: f64) {
        self.cache.set(Some(value));
    }

    pub(crate) fn invalidate_cache(&self) {
        self.cache.set(None);
    }
}

/// What a cell holds. The display/raw split lives in [`Cell::value`] and
/// [`Cell::text`]; this type owns the per-variant state.
#[derive(Debug, Clone)]
pub enum CellContent {
    Empty,
    Text(String),
    Formula(FormulaCell),
}

impl CellContent {
    /// Interpret an edit string.
    ///
    /// Empty input clears, `=`-prefixed input of length ≥ 2 parses as a
    /// formula, everything else (including the lone `"="`) is literal text.
    pub fn from_input(text: &str) -> Result<Self, SheetError> {
        if text.is_empty() {
            Ok(CellContent::Empty)
        } else if text.len() > 1 && text.starts_with(FORMULA_SIGN) {
            let formula = parse_formula(&text[1..])?;
            Ok(CellContent::Formula(FormulaCell::new(formula)))
        } else {
            Ok(CellContent::Text(text.to_string()))
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellContent::Empty)
    }

    pub(crate) fn as_formula(&self) -> Option<&FormulaCell> {
        match self {
            CellContent::Formula(fc) => Some(fc),
            _ => None,
        }
    }
}

/// The state at one grid position: content plus the dependency edges.
///
/// `refs_out` holds the cells this cell's formula reads; `refs_in` holds
/// the formula cells reading this one. Both are id sets, never owners.
#[derive(Debug)]
pub struct Cell {
    position: Position,
    pub(crate) content: CellContent,
    pub(crate) refs_out: FxHashSet<CellId>,
    pub(crate) refs_in: FxHashSet<CellId>,
}

impl Cell {
    pub(crate) fn new(position: Position) -> Self {
        Self {
            position,
            content: CellContent::Empty,
            refs_out: FxHashSet::default(),
            refs_in: FxHashSet::default(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn content(&self) -> &CellContent {
        &self.content
    }

    /// The raw edit text: empty for an empty cell, the literal text with
    /// any escape sign still attached, or `=` plus the canonical formula.
    pub fn text(&self) -> String {
        match &self.content {
            CellContent::Empty => String::new(),
            CellContent::Text(text) => text.clone(),
            CellContent::Formula(fc) => format!("{FORMULA_SIGN}{}", fc.formula().expression()),
        }
    }

    /// Positions this cell's formula reads; empty for non-formula cells.
    pub fn referenced_cells(&self) -> &[Position] {
        match &self.content {
            CellContent::Formula(fc) => fc.formula().referenced_cells(),
            _ => &[],
        }
    }

    /// The value this cell presents: `0` when empty, the escape-stripped
    /// text, or the formula result (memoized when it is a finite number).
    pub fn value(&self, sheet: &Sheet) -> CellValue {
        match &self.content {
            CellContent::Empty => CellValue::Number(0.0),
            CellContent::Text(text) => {
                let display = text.strip_prefix(ESCAPE_SIGN).unwrap_or(text);
                CellValue::Text(display.to_string())
            }
            CellContent::Formula(fc) => {
                if let Some(cached) = fc.cached() {
                    return CellValue::Number(cached);
                }
                match fc.formula().evaluate(&|pos| sheet.lookup_number(pos)) {
                    Ok(value) => {
                        fc.store_cache(value);
                        CellValue::Number(value)
                    }
                    Err(error) => CellValue::Error(error),
                }
            }
        }
    }
}

/// Strict decimal grammar for text operands: `-?(0|[1-9][0-9]*)(.[0-9]+)?`.
///
/// Deliberately narrower than `f64::from_str`: no leading zeros, no leading
/// `+`, no exponent, no bare `.` forms. Anything else makes the referencing
/// formula a `#VALUE!`.
pub(crate) fn parse_strict_number(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut i = 0;

    if i < bytes.len() && bytes[i] == b'-' {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == int_start {
        return None;
    }
    if bytes[int_start] == b'0' && i - int_start > 1 {
        return None;
    }

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == frac_start {
            return None;
        }
    }

    if i != bytes.len() {
        return None;
    }
    text.parse::<f64>().ok()
}
