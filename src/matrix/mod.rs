// Copyright (c) 2024-present, grid-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! A row × column matrix of mixed-type cells, layered on either a dense
//! filled store (backed by a multi-type vector) or a sparse map-backed
//! store. The backend and the initial cell value are chosen at
//! construction via [`Density`].

mod flags;
mod storage;

use crate::element::ElementType;
use crate::{Error, Result};
use flags::FlagStorage;
use storage::{FilledStorage, InitValue, MatrixStore, SparseStorage, Storage};

/// Storage layout × initial cell value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Density {
    /// Dense array storage, cells start as numeric zero
    FilledZero,

    /// Dense array storage, cells start empty
    FilledEmpty,

    /// Sparse map storage, absent cells read as numeric zero
    SparseZero,

    /// Sparse map storage, absent cells read as empty
    SparseEmpty,
}

/// An owned matrix cell value
#[derive(Clone, Debug, PartialEq)]
pub enum MatrixElement {
    /// No value
    Empty,

    /// 64-bit float
    Numeric(f64),

    /// 64-bit signed integer
    Integer(i64),

    /// Boolean
    Boolean(bool),

    /// Owned string
    String(String),
}

impl MatrixElement {
    /// Returns the type tag of this cell value.
    #[must_use]
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Empty => ElementType::Empty,
            Self::Numeric(_) => ElementType::Numeric,
            Self::Integer(_) => ElementType::Integer,
            Self::Boolean(_) => ElementType::Boolean,
            Self::String(_) => ElementType::String,
        }
    }

    fn as_cell_ref(&self) -> MatrixCellRef<'_> {
        match self {
            Self::Empty => MatrixCellRef::Empty,
            Self::Numeric(v) => MatrixCellRef::Numeric(*v),
            Self::Integer(v) => MatrixCellRef::Integer(*v),
            Self::Boolean(v) => MatrixCellRef::Boolean(*v),
            Self::String(v) => MatrixCellRef::String(v),
        }
    }
}

impl From<f64> for MatrixElement {
    fn from(value: f64) -> Self {
        Self::Numeric(value)
    }
}

impl From<i64> for MatrixElement {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for MatrixElement {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<bool> for MatrixElement {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<String> for MatrixElement {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for MatrixElement {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

/// Borrowed view of a matrix cell, as passed to [`MixedTypeMatrix::walk`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MatrixCellRef<'a> {
    /// No value
    Empty,

    /// 64-bit float
    Numeric(f64),

    /// 64-bit signed integer
    Integer(i64),

    /// Boolean
    Boolean(bool),

    /// Borrowed string
    String(&'a str),
}

/// A 2-D matrix of mixed-type cells with selectable storage density.
///
/// # Example
///
/// ```
/// use grid_index::{Density, MixedTypeMatrix};
///
/// let mut mx = MixedTypeMatrix::new(3, 3, Density::FilledEmpty);
/// mx.set(0, 0, 1.5)?;
/// mx.set(1, 1, "title")?;
///
/// assert_eq!(1.5, mx.get_numeric(0, 0)?);
/// assert!(!mx.numeric());
/// # Ok::<(), grid_index::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct MixedTypeMatrix {
    storage: Storage,
    flags: FlagStorage,
    density: Density,
}

impl MixedTypeMatrix {
    /// Creates a matrix of the given size, with backend and initial cell
    /// value chosen by `density`.
    #[must_use]
    pub fn new(rows: usize, cols: usize, density: Density) -> Self {
        let storage = match density {
            Density::FilledZero => Storage::from(FilledStorage::new(rows, cols, InitValue::Zero)),
            Density::FilledEmpty => {
                Storage::from(FilledStorage::new(rows, cols, InitValue::Empty))
            }
            Density::SparseZero => Storage::from(SparseStorage::new(rows, cols, InitValue::Zero)),
            Density::SparseEmpty => {
                Storage::from(SparseStorage::new(rows, cols, InitValue::Empty))
            }
        };

        Self {
            storage,
            flags: FlagStorage::default(),
            density,
        }
    }

    /// The density the matrix was constructed with.
    #[must_use]
    pub fn density(&self) -> Density {
        self.density
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.storage.rows()
    }

    /// Number of columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.storage.cols()
    }

    /// `(rows, cols)` pair.
    #[must_use]
    pub fn size(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    /// Type tag of the cell at `(row, col)`.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if the coordinate exceeds the matrix.
    pub fn get_type(&self, row: usize, col: usize) -> Result<ElementType> {
        self.check_bounds(row, col)?;
        Ok(self.storage.cell_type(row, col))
    }

    /// Owned copy of the cell at `(row, col)`.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if the coordinate exceeds the matrix.
    pub fn get(&self, row: usize, col: usize) -> Result<MatrixElement> {
        self.check_bounds(row, col)?;
        Ok(self.storage.cell(row, col))
    }

    /// Numeric value of the cell; integers widen and booleans read as
    /// `1.0` / `0.0`.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if the coordinate exceeds the matrix, `TypeMismatch`
    /// for empty and string cells.
    pub fn get_numeric(&self, row: usize, col: usize) -> Result<f64> {
        self.check_bounds(row, col)?;

        match self.storage.cell(row, col) {
            MatrixElement::Numeric(v) => Ok(v),
            MatrixElement::Integer(v) => Ok(v as f64),
            MatrixElement::Boolean(v) => Ok(if v { 1.0 } else { 0.0 }),
            other => Err(Error::TypeMismatch {
                expected: ElementType::Numeric,
                actual: other.element_type(),
            }),
        }
    }

    /// Integer value of the cell.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` / `TypeMismatch` as for [`Self::get_numeric`].
    pub fn get_integer(&self, row: usize, col: usize) -> Result<i64> {
        self.check_bounds(row, col)?;

        match self.storage.cell(row, col) {
            MatrixElement::Integer(v) => Ok(v),
            other => Err(Error::TypeMismatch {
                expected: ElementType::Integer,
                actual: other.element_type(),
            }),
        }
    }

    /// Boolean value of the cell.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` / `TypeMismatch` as for [`Self::get_numeric`].
    pub fn get_boolean(&self, row: usize, col: usize) -> Result<bool> {
        self.check_bounds(row, col)?;

        match self.storage.cell(row, col) {
            MatrixElement::Boolean(v) => Ok(v),
            other => Err(Error::TypeMismatch {
                expected: ElementType::Boolean,
                actual: other.element_type(),
            }),
        }
    }

    /// Borrow of the string cell at `(row, col)`.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` / `TypeMismatch` as for [`Self::get_numeric`].
    pub fn get_string(&self, row: usize, col: usize) -> Result<&str> {
        self.check_bounds(row, col)?;

        self.storage
            .cell_str(row, col)
            .ok_or_else(|| Error::TypeMismatch {
                expected: ElementType::String,
                actual: self.storage.cell_type(row, col),
            })
    }

    /// Writes one cell.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if the coordinate exceeds the matrix.
    pub fn set(&mut self, row: usize, col: usize, value: impl Into<MatrixElement>) -> Result<()> {
        self.check_bounds(row, col)?;
        self.storage.set_cell(row, col, value.into());
        Ok(())
    }

    /// Resets one cell to the store's initial element.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if the coordinate exceeds the matrix.
    pub fn set_empty(&mut self, row: usize, col: usize) -> Result<()> {
        self.check_bounds(row, col)?;
        self.storage.set_cell(row, col, MatrixElement::Empty);
        Ok(())
    }

    /// Fills a column from row 0 downwards with the given values,
    /// stopping at the bottom row.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if `col` exceeds the matrix.
    pub fn set_column<I, E>(&mut self, col: usize, values: I) -> Result<()>
    where
        I: IntoIterator<Item = E>,
        E: Into<MatrixElement>,
    {
        if col >= self.cols() {
            return Err(Error::OutOfBounds {
                pos: col,
                size: self.cols(),
            });
        }

        for (row, value) in values.into_iter().take(self.rows()).enumerate() {
            self.storage.set_cell(row, col, value.into());
        }

        Ok(())
    }

    /// Fills a row from column 0 rightwards with the given values,
    /// stopping at the last column.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if `row` exceeds the matrix.
    pub fn set_row<I, E>(&mut self, row: usize, values: I) -> Result<()>
    where
        I: IntoIterator<Item = E>,
        E: Into<MatrixElement>,
    {
        if row >= self.rows() {
            return Err(Error::OutOfBounds {
                pos: row,
                size: self.rows(),
            });
        }

        for (col, value) in values.into_iter().take(self.cols()).enumerate() {
            self.storage.set_cell(row, col, value.into());
        }

        Ok(())
    }

    /// Resets every cell of a column to the store's initial element.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if `col` exceeds the matrix.
    pub fn set_column_empty(&mut self, col: usize) -> Result<()> {
        if col >= self.cols() {
            return Err(Error::OutOfBounds {
                pos: col,
                size: self.cols(),
            });
        }

        for row in 0..self.rows() {
            self.storage.set_cell(row, col, MatrixElement::Empty);
        }

        Ok(())
    }

    /// Resets every cell of a row to the store's initial element.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if `row` exceeds the matrix.
    pub fn set_row_empty(&mut self, row: usize) -> Result<()> {
        if row >= self.rows() {
            return Err(Error::OutOfBounds {
                pos: row,
                size: self.rows(),
            });
        }

        for col in 0..self.cols() {
            self.storage.set_cell(row, col, MatrixElement::Empty);
        }

        Ok(())
    }

    /// Resizes the matrix, preserving cells inside the intersection of the
    /// old and new sizes. Flags outside the new bounds are dropped.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.storage.resize(rows, cols);
        self.flags.truncate(rows, cols);
    }

    /// Transposes the matrix in place. Flags move with their cells.
    pub fn transpose(&mut self) {
        let mut transposed = FlagStorage::default();

        self.walk_flags(|row, col, flag| {
            transposed.set(col, row, flag);
        });

        self.storage.transpose();
        self.flags = transposed;
    }

    /// Copies cells from `other`, bounded by the intersection of the two
    /// sizes. The storage backends need not match.
    pub fn copy_from(&mut self, other: &Self) {
        let rows = self.rows().min(other.rows());
        let cols = self.cols().min(other.cols());

        for row in 0..rows {
            for col in 0..cols {
                self.storage.set_cell(row, col, other.storage.cell(row, col));
            }
        }
    }

    /// Visits every cell in storage order.
    ///
    /// For the filled backend this iterates blockwise over the backing
    /// vector (column-major); the sparse backend walks row-major.
    pub fn walk(&self, mut f: impl FnMut(usize, usize, MatrixCellRef<'_>)) {
        self.storage.walk_cells(&mut f);
    }

    /// `true` iff every cell is numeric, integer or boolean. An empty-sized
    /// matrix is not numeric.
    #[must_use]
    pub fn numeric(&self) -> bool {
        self.storage.is_numeric()
    }

    /// `true` iff every cell is empty.
    #[must_use]
    pub fn all_empty(&self) -> bool {
        self.storage.is_all_empty()
    }

    /// Exchanges contents with `other` in O(1).
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Shrinks the matrix to size zero, dropping all cells and flags.
    pub fn clear(&mut self) {
        self.resize(0, 0);
        self.flags.clear_all();
    }

    /// Reads the flag bits of a cell (0 when never set).
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if the coordinate exceeds the matrix.
    pub fn get_flag(&self, row: usize, col: usize) -> Result<u8> {
        self.check_bounds(row, col)?;
        Ok(self.flags.get(row, col))
    }

    /// Stores flag bits for a cell.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if the coordinate exceeds the matrix.
    pub fn set_flag(&mut self, row: usize, col: usize, flag: u8) -> Result<()> {
        self.check_bounds(row, col)?;
        self.flags.set(row, col, flag);
        Ok(())
    }

    /// Clears the flag bits of a cell.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if the coordinate exceeds the matrix.
    pub fn clear_flag(&mut self, row: usize, col: usize) -> Result<()> {
        self.check_bounds(row, col)?;
        self.flags.clear(row, col);
        Ok(())
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.rows() {
            return Err(Error::OutOfBounds {
                pos: row,
                size: self.rows(),
            });
        }

        if col >= self.cols() {
            return Err(Error::OutOfBounds {
                pos: col,
                size: self.cols(),
            });
        }

        Ok(())
    }

    fn walk_flags(&self, mut f: impl FnMut(usize, usize, u8)) {
        for row in 0..self.rows() {
            for col in 0..self.cols() {
                let flag = self.flags.get(row, col);

                if flag != 0 {
                    f(row, col, flag);
                }
            }
        }
    }
}

impl PartialEq for MixedTypeMatrix {
    /// Element-wise equality; the storage backends need not match.
    fn eq(&self, other: &Self) -> bool {
        if self.size() != other.size() {
            return false;
        }

        for row in 0..self.rows() {
            for col in 0..self.cols() {
                if self.storage.cell(row, col) != other.storage.cell(row, col) {
                    return false;
                }
            }
        }

        true
    }
}
