// Copyright 2024 Saorsa Labs
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Coding backends
//!
//! The Galois-field arithmetic is supplied by an external coding library;
//! the harness binds to it through [`CodingBackend`] and never touches the
//! field operations directly.

use crate::matrix::Matrix;
use crate::Result;
use std::fmt;

pub mod galois;

/// Precomputed expansion of a coefficient submatrix, consumed only by
/// [`CodingBackend::encode`]. Opaque to the harness: no structure beyond the
/// shape is assumed.
#[derive(Debug, Clone)]
pub struct CodingTable {
    inputs: usize,
    outputs: usize,
    coefficients: Vec<u8>,
}

impl CodingTable {
    pub(crate) fn from_matrix(rows: &Matrix) -> Self {
        let mut coefficients = Vec::with_capacity(rows.rows() * rows.cols());
        for r in 0..rows.rows() {
            coefficients.extend_from_slice(rows.row(r));
        }
        Self {
            inputs: rows.cols(),
            outputs: rows.rows(),
            coefficients,
        }
    }

    /// Number of input rows each output is combined from.
    pub fn inputs(&self) -> usize {
        self.inputs
    }

    /// Number of output rows the table produces.
    pub fn outputs(&self) -> usize {
        self.outputs
    }

    pub(crate) fn coefficient(&self, out_row: usize, in_row: usize) -> u8 {
        self.coefficients[out_row * self.inputs + in_row]
    }
}

/// Contract with the external erasure-coding library.
///
/// Encode and decode are the same primitive driven by different coefficient
/// tables: parity rows of the generator matrix for encoding, rows of the
/// inverted surviving submatrix for decoding.
pub trait CodingBackend: Send + Sync + fmt::Debug {
    /// Systematic Reed-Solomon generator matrix: identity over the first k
    /// rows, parity coefficient rows below. The library guarantees the
    /// invertibility of the k x k submatrices for supported shapes.
    fn gen_rs_matrix(&self, m: usize, k: usize) -> Matrix;

    /// Expand coefficient rows into the precomputed form the encode
    /// primitive consumes.
    fn init_tables(&self, rows: &Matrix) -> CodingTable;

    /// Combine `inputs` into `outputs` over `len` bytes per row, one output
    /// per table row. Synchronous, idempotent for fixed inputs.
    fn encode(&self, len: usize, table: &CodingTable, inputs: &[&[u8]], outputs: &mut [&mut [u8]]);

    /// Invert a square matrix over GF(2^8).
    ///
    /// Fails with [`EcPerfError::SingularMatrix`](crate::EcPerfError) when the
    /// input has no inverse, which for this harness means the erasure pattern
    /// cannot be recovered under the chosen generator matrix.
    fn invert_matrix(&self, matrix: &Matrix) -> Result<Matrix>;

    /// Backend name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Create the default backend.
pub fn create_backend() -> Box<dyn CodingBackend> {
    Box::new(galois::GaloisBackend::new())
}
