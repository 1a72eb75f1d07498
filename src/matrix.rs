// Copyright 2024 Saorsa Labs
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Byte matrices over GF(2^8) and the erasure-recovery construction

use crate::backends::CodingBackend;
use crate::Result;

/// Dense row-major byte matrix over GF(2^8).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<u8>,
}

impl Matrix {
    /// All-zero matrix of the given shape.
    pub fn zero(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0; rows * cols],
        }
    }

    /// n x n identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zero(n, n);
        for i in 0..n {
            m.set(i, i, 1);
        }
        m
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        self.data[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[u8] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for col in 0..self.cols {
            self.data.swap(a * self.cols + col, b * self.cols + col);
        }
    }

    /// New matrix made of the given rows of `self`, in the order listed.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &i in indices {
            data.extend_from_slice(self.row(i));
        }
        Self {
            rows: indices.len(),
            cols: self.cols,
            data,
        }
    }
}

/// Everything the decode phase needs: which shards survived and the
/// coefficients that rebuild the erased ones from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryPlan {
    /// Indices of the k surviving shards, in original order
    pub survivors: Vec<usize>,
    /// nerrs x k decode coefficient matrix, row i rebuilding erasure i
    pub matrix: Matrix,
}

impl RecoveryPlan {
    /// Number of shards the plan reconstructs.
    pub fn erasure_count(&self) -> usize {
        self.matrix.rows()
    }
}

/// Build the decode coefficients for an erasure pattern.
///
/// Selects the k rows of `coding` whose shards survived (relative order
/// preserved), inverts that square submatrix through the backend, then
/// extracts the inverse rows matching the erased indices. An empty erasure
/// set yields an empty plan.
pub fn build_recovery_plan(
    backend: &dyn CodingBackend,
    coding: &Matrix,
    erasures: &[usize],
    k: usize,
) -> Result<RecoveryPlan> {
    let m = coding.rows();
    let mut lost = vec![false; m];
    for &idx in erasures {
        lost[idx] = true;
    }

    let survivors: Vec<usize> = (0..m).filter(|&r| !lost[r]).take(k).collect();

    if erasures.is_empty() {
        return Ok(RecoveryPlan {
            survivors,
            matrix: Matrix::zero(0, k),
        });
    }

    let surviving = coding.select_rows(&survivors);
    let inverse = backend.invert_matrix(&surviving)?;
    // Erased indices are data rows, so they index straight into the inverse.
    let matrix = inverse.select_rows(erasures);

    Ok(RecoveryPlan { survivors, matrix })
}
