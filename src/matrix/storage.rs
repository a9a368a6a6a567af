// Copyright (c) 2024-present, grid-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::{MatrixCellRef, MatrixElement};
use crate::element::ElementType;
use crate::vector::MultiTypeVector;
use enum_dispatch::enum_dispatch;
use rustc_hash::FxHashMap;

/// Initial value of cells that were never written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InitValue {
    /// Cells start as numeric zero
    Zero,

    /// Cells start empty
    Empty,
}

impl InitValue {
    fn element_type(self) -> ElementType {
        match self {
            Self::Zero => ElementType::Numeric,
            Self::Empty => ElementType::Empty,
        }
    }

    fn element(self) -> MatrixElement {
        match self {
            Self::Zero => MatrixElement::Numeric(0.0),
            Self::Empty => MatrixElement::Empty,
        }
    }
}

#[enum_dispatch]
pub(crate) trait MatrixStore {
    fn rows(&self) -> usize;

    fn cols(&self) -> usize;

    /// Type tag of the cell; callers have bounds-checked `(row, col)`.
    fn cell_type(&self, row: usize, col: usize) -> ElementType;

    /// Owned copy of the cell value.
    fn cell(&self, row: usize, col: usize) -> MatrixElement;

    /// Borrow of a string cell, `None` for any other type.
    fn cell_str(&self, row: usize, col: usize) -> Option<&str>;

    fn set_cell(&mut self, row: usize, col: usize, value: MatrixElement);

    /// Resizes the store, preserving cells inside the intersection.
    fn resize(&mut self, rows: usize, cols: usize);

    /// Flips rows and columns.
    fn transpose(&mut self);

    /// `true` iff every cell is numeric, integer or boolean.
    fn is_numeric(&self) -> bool;

    /// `true` iff every cell is empty.
    fn is_all_empty(&self) -> bool;

    fn walk_cells(&self, f: &mut dyn FnMut(usize, usize, MatrixCellRef<'_>));
}

/// Storage backend, chosen by the matrix density at construction.
#[enum_dispatch(MatrixStore)]
#[derive(Clone, Debug)]
pub(crate) enum Storage {
    Filled(FilledStorage),
    Sparse(SparseStorage),
}

/// Dense backend: one column-major multi-type vector covering every cell.
#[derive(Clone, Debug)]
pub(crate) struct FilledStorage {
    data: MultiTypeVector,
    rows: usize,
    cols: usize,
    init: InitValue,
}

impl FilledStorage {
    pub fn new(rows: usize, cols: usize, init: InitValue) -> Self {
        Self {
            data: filled_vector(rows * cols, init),
            rows,
            cols,
            init,
        }
    }

    fn index(&self, row: usize, col: usize) -> usize {
        col * self.rows + row
    }

    fn rebuild(&mut self, rows: usize, cols: usize, swap_axes: bool) {
        let mut data = filled_vector(rows * cols, self.init);

        for col in 0..self.cols {
            for row in 0..self.rows {
                let (new_row, new_col) = if swap_axes { (col, row) } else { (row, col) };

                if new_row >= rows || new_col >= cols {
                    continue;
                }

                let value = self.cell(row, col);
                let idx = new_col * rows + new_row;

                // Positions are in range by construction.
                let _ = match value {
                    MatrixElement::Empty => set_vector_empty(&mut data, idx),
                    MatrixElement::Numeric(v) => data.set(idx, v),
                    MatrixElement::Integer(v) => data.set(idx, v),
                    MatrixElement::Boolean(v) => data.set(idx, v),
                    MatrixElement::String(v) => data.set(idx, v),
                };
            }
        }

        self.data = data;
        self.rows = rows;
        self.cols = cols;
    }
}

impl MatrixStore for FilledStorage {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn cell_type(&self, row: usize, col: usize) -> ElementType {
        self.data
            .element_type(self.index(row, col))
            .unwrap_or(ElementType::Empty)
    }

    fn cell(&self, row: usize, col: usize) -> MatrixElement {
        let idx = self.index(row, col);

        match self.cell_type(row, col) {
            ElementType::Numeric => self
                .data
                .get::<f64>(idx)
                .map_or(MatrixElement::Empty, MatrixElement::Numeric),
            ElementType::Integer => self
                .data
                .get::<i64>(idx)
                .map_or(MatrixElement::Empty, MatrixElement::Integer),
            ElementType::Boolean => self
                .data
                .get::<bool>(idx)
                .map_or(MatrixElement::Empty, MatrixElement::Boolean),
            ElementType::String => self
                .data
                .get::<String>(idx)
                .map_or(MatrixElement::Empty, MatrixElement::String),
            ElementType::Empty | ElementType::User => MatrixElement::Empty,
        }
    }

    fn cell_str(&self, row: usize, col: usize) -> Option<&str> {
        self.data.get_str(self.index(row, col)).ok()
    }

    fn set_cell(&mut self, row: usize, col: usize, value: MatrixElement) {
        let idx = self.index(row, col);

        // Positions are in range; the matrix layer bounds-checks.
        let _ = match value {
            MatrixElement::Empty => set_vector_empty(&mut self.data, idx),
            MatrixElement::Numeric(v) => self.data.set(idx, v),
            MatrixElement::Integer(v) => self.data.set(idx, v),
            MatrixElement::Boolean(v) => self.data.set(idx, v),
            MatrixElement::String(v) => self.data.set(idx, v),
        };
    }

    fn resize(&mut self, rows: usize, cols: usize) {
        self.rebuild(rows, cols, false);
    }

    fn transpose(&mut self) {
        self.rebuild(self.cols, self.rows, true);
    }

    fn is_numeric(&self) -> bool {
        if self.rows * self.cols == 0 {
            return false;
        }

        self.data.iter_blocks().all(|block| {
            matches!(
                block.element_type,
                ElementType::Numeric | ElementType::Integer | ElementType::Boolean,
            )
        })
    }

    fn is_all_empty(&self) -> bool {
        self.data
            .iter_blocks()
            .all(|block| block.element_type == ElementType::Empty)
    }

    fn walk_cells(&self, f: &mut dyn FnMut(usize, usize, MatrixCellRef<'_>)) {
        if self.rows == 0 {
            return;
        }

        for block in self.data.iter_blocks() {
            for i in 0..block.size {
                let pos = block.position + i;
                let row = pos % self.rows;
                let col = pos / self.rows;

                let cell = match block.data {
                    None => MatrixCellRef::Empty,
                    Some(data) => cell_ref_at(data, i),
                };

                f(row, col, cell);
            }
        }
    }
}

/// Sparse backend: map-backed cells; anything absent is the init element.
#[derive(Clone, Debug)]
pub(crate) struct SparseStorage {
    cells: FxHashMap<(usize, usize), MatrixElement>,
    rows: usize,
    cols: usize,
    init: InitValue,
}

impl SparseStorage {
    pub fn new(rows: usize, cols: usize, init: InitValue) -> Self {
        Self {
            cells: FxHashMap::default(),
            rows,
            cols,
            init,
        }
    }
}

impl MatrixStore for SparseStorage {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn cell_type(&self, row: usize, col: usize) -> ElementType {
        self.cells
            .get(&(row, col))
            .map_or_else(|| self.init.element_type(), MatrixElement::element_type)
    }

    fn cell(&self, row: usize, col: usize) -> MatrixElement {
        self.cells
            .get(&(row, col))
            .cloned()
            .unwrap_or_else(|| self.init.element())
    }

    fn cell_str(&self, row: usize, col: usize) -> Option<&str> {
        match self.cells.get(&(row, col)) {
            Some(MatrixElement::String(s)) => Some(s),
            _ => None,
        }
    }

    fn set_cell(&mut self, row: usize, col: usize, value: MatrixElement) {
        if value == self.init.element() {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), value);
        }
    }

    fn resize(&mut self, rows: usize, cols: usize) {
        self.cells.retain(|&(r, c), _| r < rows && c < cols);
        self.rows = rows;
        self.cols = cols;
    }

    fn transpose(&mut self) {
        let cells = std::mem::take(&mut self.cells);

        self.cells = cells
            .into_iter()
            .map(|((r, c), value)| ((c, r), value))
            .collect();

        std::mem::swap(&mut self.rows, &mut self.cols);
    }

    fn is_numeric(&self) -> bool {
        if self.rows * self.cols == 0 {
            return false;
        }

        if self.init == InitValue::Empty && self.cells.len() < self.rows * self.cols {
            return false;
        }

        self.cells.values().all(|value| {
            matches!(
                value,
                MatrixElement::Numeric(_) | MatrixElement::Integer(_) | MatrixElement::Boolean(_),
            )
        })
    }

    fn is_all_empty(&self) -> bool {
        let total = self.rows * self.cols;

        if total == 0 {
            return true;
        }

        // Under zero-init, absent cells read as numeric; every cell must
        // have been overwritten with an explicit empty.
        if self.init == InitValue::Zero && self.cells.len() < total {
            return false;
        }

        self.cells
            .values()
            .all(|value| matches!(value, MatrixElement::Empty))
    }

    fn walk_cells(&self, f: &mut dyn FnMut(usize, usize, MatrixCellRef<'_>)) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let cell = match self.cells.get(&(row, col)) {
                    Some(value) => value.as_cell_ref(),
                    None => match self.init {
                        InitValue::Zero => MatrixCellRef::Numeric(0.0),
                        InitValue::Empty => MatrixCellRef::Empty,
                    },
                };

                f(row, col, cell);
            }
        }
    }
}

fn filled_vector(n: usize, init: InitValue) -> MultiTypeVector {
    match init {
        InitValue::Zero => MultiTypeVector::with_value(n, 0.0),
        InitValue::Empty => MultiTypeVector::new(n),
    }
}

fn set_vector_empty(data: &mut MultiTypeVector, idx: usize) -> crate::Result<()> {
    data.set_empty(idx, idx)
}

fn cell_ref_at<'a>(data: &'a crate::element::ElementBlock, i: usize) -> MatrixCellRef<'a> {
    use crate::element::ElementBlock;

    match data {
        ElementBlock::Numeric(values) => values
            .get(i)
            .map_or(MatrixCellRef::Empty, |v| MatrixCellRef::Numeric(*v)),
        ElementBlock::Integer(values) => values
            .get(i)
            .map_or(MatrixCellRef::Empty, |v| MatrixCellRef::Integer(*v)),
        ElementBlock::Boolean(values) => values
            .get(i)
            .map_or(MatrixCellRef::Empty, |v| MatrixCellRef::Boolean(*v)),
        ElementBlock::String(values) => values
            .get(i)
            .map_or(MatrixCellRef::Empty, |v| MatrixCellRef::String(v)),
        ElementBlock::User(_) => MatrixCellRef::Empty,
    }
}
