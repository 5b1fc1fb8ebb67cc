//! The sheet: cell arena, position index, dependency graph maintenance,
//! and rendering of the printable rectangle.

use std::io::{self, Write};

use quadrille_common::{CellValue, FormulaError, FormulaErrorKind, Position};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::cell::{parse_strict_number, Cell, CellContent, CellId};
use crate::error::SheetError;

/// A two-dimensional grid of cells addressed by [`Position`].
///
/// Cells live in an append-only arena; `index` maps a position to its slot.
/// A position is *present* once it has been written to or referenced by a
/// formula, and stays present for the sheet's lifetime — clearing resets the
/// content but keeps the slot, so edges held by other cells never dangle.
#[derive(Debug, Default)]
pub struct Sheet {
    cells: Vec<Cell>,
    index: FxHashMap<Position, CellId>,
}

impl Sheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the textual content of a cell.
    ///
    /// The edit is atomic: on any error the sheet's values, edges and caches
    /// are exactly as before (a rejected formula may still have materialized
    /// its referenced positions as empty cells, which is unobservable through
    /// values, text, or the printable rectangle).
    pub fn set_cell(&mut self, position: Position, text: &str) -> Result<(), SheetError> {
        if !position.is_valid() {
            return Err(SheetError::InvalidPosition);
        }
        let candidate = CellContent::from_input(text)?;
        let id = self.get_or_create(position);

        // Materialize referenced positions first: the cycle search below
        // walks their (possibly empty) out-edge sets, and a successful edit
        // needs them as edge targets.
        let new_refs: Vec<CellId> = match candidate.as_formula() {
            Some(fc) => {
                let positions = fc.formula().referenced_cells().to_vec();
                let refs = positions
                    .into_iter()
                    .map(|pos| self.get_or_create(pos))
                    .collect::<Vec<_>>();
                if self.creates_cycle(id, &refs) {
                    return Err(SheetError::CircularDependency);
                }
                refs
            }
            None => Vec::new(),
        };

        // Invalidation must walk the pre-swap graph: dependents reach this
        // cell only along the edges that exist right now.
        self.invalidate_dependents(id);
        self.detach_out_edges(id);
        self.cells[id.as_index()].content = candidate;
        for &target in &new_refs {
            self.cells[id.as_index()].refs_out.insert(target);
            self.cells[target.as_index()].refs_in.insert(id);
        }
        Ok(())
    }

    /// Reset a cell to empty. Incoming edges are kept: formulas that read
    /// this cell keep reading it and now see `0`.
    pub fn clear_cell(&mut self, position: Position) -> Result<(), SheetError> {
        if !position.is_valid() {
            return Err(SheetError::InvalidPosition);
        }
        let Some(&id) = self.index.get(&position) else {
            return Ok(());
        };
        self.invalidate_dependents(id);
        self.detach_out_edges(id);
        self.cells[id.as_index()].content = CellContent::Empty;
        Ok(())
    }

    /// The cell at `position`, or `None` if the slot was never touched.
    pub fn get_cell(&self, position: Position) -> Result<Option<&Cell>, SheetError> {
        if !position.is_valid() {
            return Err(SheetError::InvalidPosition);
        }
        Ok(self
            .index
            .get(&position)
            .map(|&id| &self.cells[id.as_index()]))
    }

    /// The value presented at `position`; an untouched slot presents the
    /// same `0` an empty cell does.
    pub fn value(&self, position: Position) -> Result<CellValue, SheetError> {
        Ok(match self.get_cell(position)? {
            Some(cell) => cell.value(self),
            None => CellValue::Number(0.0),
        })
    }

    /// The raw text at `position`; untouched slots read as empty.
    pub fn text(&self, position: Position) -> Result<String, SheetError> {
        Ok(match self.get_cell(position)? {
            Some(cell) => cell.text(),
            None => String::new(),
        })
    }

    /// One past the maximal row and column holding a non-empty cell;
    /// `(0, 0)` for a sheet with no content.
    pub fn printable_size(&self) -> (u32, u32) {
        let mut rows = 0;
        let mut cols = 0;
        for cell in &self.cells {
            if cell.content().is_empty() {
                continue;
            }
            rows = rows.max(cell.position().row() + 1);
            cols = cols.max(cell.position().col() + 1);
        }
        (rows, cols)
    }

    /// Render evaluated values over the printable rectangle: tab-separated
    /// cells, one line per row. Empty and untouched slots render as nothing.
    pub fn print_values<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.print_with(out, |cell| cell.value(self).to_string())
    }

    /// Render raw texts over the printable rectangle.
    pub fn print_texts<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.print_with(out, |cell| cell.text())
    }

    fn print_with<W, F>(&self, out: &mut W, render: F) -> io::Result<()>
    where
        W: Write,
        F: Fn(&Cell) -> String,
    {
        let (rows, cols) = self.printable_size();
        for row in 0..rows {
            for col in 0..cols {
                if col != 0 {
                    out.write_all(b"\t")?;
                }
                if let Some(&id) = self.index.get(&Position::new(row, col)) {
                    let cell = &self.cells[id.as_index()];
                    if !cell.content().is_empty() {
                        out.write_all(render(cell).as_bytes())?;
                    }
                }
            }
            out.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Resolve a referenced position to a number for the evaluator.
    ///
    /// Untouched slots read `0`. A present cell contributes its display
    /// value: numbers as-is, text through the strict decimal grammar
    /// (else `#VALUE!`), errors propagated.
    pub(crate) fn lookup_number(&self, position: Position) -> Result<f64, FormulaError> {
        let Some(&id) = self.index.get(&position) else {
            return Ok(0.0);
        };
        match self.cells[id.as_index()].value(self) {
            CellValue::Number(n) => Ok(n),
            CellValue::Text(text) => parse_strict_number(&text)
                .ok_or_else(|| FormulaError::new(FormulaErrorKind::Value)),
            CellValue::Error(error) => Err(error),
        }
    }

    fn get_or_create(&mut self, position: Position) -> CellId {
        if let Some(&id) = self.index.get(&position) {
            return id;
        }
        let id = CellId::new(self.cells.len() as u32);
        self.cells.push(Cell::new(position));
        self.index.insert(position, id);
        id
    }

    /// Would pointing `target` at `start_refs` close a cycle? DFS over the
    /// current out-edges; reaching `target` is the cycle signal. A
    /// self-reference appears in `start_refs` directly and trips on the
    /// first pop.
    fn creates_cycle(&self, target: CellId, start_refs: &[CellId]) -> bool {
        let mut visited = FxHashSet::default();
        let mut stack: Vec<CellId> = start_refs.to_vec();

        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if !visited.insert(id) {
                continue;
            }
            stack.extend(self.cells[id.as_index()].refs_out.iter().copied());
        }
        false
    }

    /// Drop the memoized result of every formula transitively reading the
    /// given cell. Recurses only through cells whose cache was still set:
    /// a cacheless cell's dependents were already invalidated when its own
    /// cache was dropped, and cannot have refilled since (refilling a
    /// dependent re-evaluates — and re-caches — this cell first).
    fn invalidate_dependents(&self, id: CellId) {
        let mut visited = FxHashSet::default();
        visited.insert(id);
        let mut stack: Vec<CellId> = self.cells[id.as_index()].refs_in.iter().copied().collect();

        while let Some(dependent) = stack.pop() {
            if !visited.insert(dependent) {
                continue;
            }
            let cell = &self.cells[dependent.as_index()];
            if let Some(fc) = cell.content().as_formula() {
                if fc.is_cache_valid() {
                    fc.invalidate_cache();
                    stack.extend(cell.refs_in.iter().copied());
                }
            }
        }
    }

    fn detach_out_edges(&mut self, id: CellId) {
        let out: Vec<CellId> = self.cells[id.as_index()].refs_out.drain().collect();
        for target in out {
            self.cells[target.as_index()].refs_in.remove(&id);
        }
    }

    #[cfg(test)]
    pub(crate) fn edge_sets(&self, position: Position) -> (Vec<Position>, Vec<Position>) {
        let id = self.index[&position];
        let cell = &self.cells[id.as_index()];
        let mut out: Vec<Position> = cell
            .refs_out
            .iter()
            .map(|&i| self.cells[i.as_index()].position())
            .collect();
        let mut incoming: Vec<Position> = cell
            .refs_in
            .iter()
            .map(|&i| self.cells[i.as_index()].position())
            .collect();
        out.sort_unstable();
        incoming.sort_unstable();
        (out, incoming)
    }
}
