// Copyright (c) 2024-present, grid-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use rustc_hash::FxHashMap;

/// Per-cell flag bits, stored separately from the element storage so that
/// flag values survive element writes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct FlagStorage {
    map: FxHashMap<(usize, usize), u8>,
}

impl FlagStorage {
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.map.get(&(row, col)).copied().unwrap_or_default()
    }

    pub fn set(&mut self, row: usize, col: usize, flag: u8) {
        if flag == 0 {
            self.map.remove(&(row, col));
        } else {
            self.map.insert((row, col), flag);
        }
    }

    pub fn clear(&mut self, row: usize, col: usize) {
        self.map.remove(&(row, col));
    }

    pub fn clear_all(&mut self) {
        self.map.clear();
    }

    /// Drops flags referring to cells outside the new bounds.
    pub fn truncate(&mut self, rows: usize, cols: usize) {
        self.map.retain(|&(r, c), _| r < rows && c < cols);
    }
}
