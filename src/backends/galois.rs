// Copyright 2024 Saorsa Labs
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Backend bound to the `reed-solomon-erasure` GF(2^8) kernels
//!
//! All field arithmetic goes through the library's `galois_8::Field`; its
//! slice kernels (`mul_slice`, `mul_slice_add`) carry the per-coefficient
//! table expansion and accelerated dispatch internally.

use super::{CodingBackend, CodingTable};
use crate::matrix::Matrix;
use crate::{EcPerfError, Result};
use reed_solomon_erasure::{galois_8, Field};

type Gf = galois_8::Field;

/// Default [`CodingBackend`] implementation.
#[derive(Debug, Default)]
pub struct GaloisBackend;

impl GaloisBackend {
    pub fn new() -> Self {
        Self
    }
}

impl CodingBackend for GaloisBackend {
    fn gen_rs_matrix(&self, m: usize, k: usize) -> Matrix {
        let mut a = Matrix::zero(m, k);
        for i in 0..k.min(m) {
            a.set(i, i, 1);
        }
        // Parity row i holds gen^0 .. gen^(k-1) with gen = 2^(i-k); the first
        // parity row is all ones.
        let mut gen = 1u8;
        for i in k..m {
            let mut p = 1u8;
            for j in 0..k {
                a.set(i, j, p);
                p = Gf::mul(p, gen);
            }
            gen = Gf::mul(gen, 2);
        }
        a
    }

    fn init_tables(&self, rows: &Matrix) -> CodingTable {
        CodingTable::from_matrix(rows)
    }

    fn encode(&self, len: usize, table: &CodingTable, inputs: &[&[u8]], outputs: &mut [&mut [u8]]) {
        debug_assert_eq!(inputs.len(), table.inputs());
        debug_assert_eq!(outputs.len(), table.outputs());

        for (r, out) in outputs.iter_mut().enumerate() {
            let out = &mut out[..len];
            Gf::mul_slice(table.coefficient(r, 0), &inputs[0][..len], out);
            for (j, input) in inputs.iter().enumerate().skip(1) {
                Gf::mul_slice_add(table.coefficient(r, j), &input[..len], out);
            }
        }
    }

    fn invert_matrix(&self, matrix: &Matrix) -> Result<Matrix> {
        debug_assert_eq!(matrix.rows(), matrix.cols());
        let n = matrix.rows();
        let mut work = matrix.clone();
        let mut inverse = Matrix::identity(n);

        // Gauss-Jordan elimination; addition in GF(2^8) is XOR.
        for col in 0..n {
            let pivot = (col..n)
                .find(|&r| work.get(r, col) != 0)
                .ok_or(EcPerfError::SingularMatrix)?;
            work.swap_rows(pivot, col);
            inverse.swap_rows(pivot, col);

            let d = work.get(col, col);
            if d != 1 {
                for j in 0..n {
                    work.set(col, j, Gf::div(work.get(col, j), d));
                    inverse.set(col, j, Gf::div(inverse.get(col, j), d));
                }
            }

            for r in 0..n {
                if r == col {
                    continue;
                }
                let f = work.get(r, col);
                if f == 0 {
                    continue;
                }
                for j in 0..n {
                    let w = work.get(r, j) ^ Gf::mul(f, work.get(col, j));
                    work.set(r, j, w);
                    let v = inverse.get(r, j) ^ Gf::mul(f, inverse.get(col, j));
                    inverse.set(r, j, v);
                }
            }
        }

        Ok(inverse)
    }

    fn name(&self) -> &'static str {
        "galois_8"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mat_mul(a: &Matrix, b: &Matrix) -> Matrix {
        let mut out = Matrix::zero(a.rows(), b.cols());
        for i in 0..a.rows() {
            for j in 0..b.cols() {
                let mut acc = 0u8;
                for t in 0..a.cols() {
                    acc ^= Gf::mul(a.get(i, t), b.get(t, j));
                }
                out.set(i, j, acc);
            }
        }
        out
    }

    #[test]
    fn generator_matrix_is_systematic() {
        let backend = GaloisBackend::new();
        let a = backend.gen_rs_matrix(14, 10);
        for i in 0..10 {
            for j in 0..10 {
                assert_eq!(a.get(i, j), u8::from(i == j));
            }
        }
        // First parity row is all ones, second holds powers of two.
        assert!(a.row(10).iter().all(|&c| c == 1));
        assert_eq!(&a.row(11)[..5], &[1, 2, 4, 8, 16]);
    }

    #[test]
    fn invert_identity_is_identity() {
        let backend = GaloisBackend::new();
        let inv = backend.invert_matrix(&Matrix::identity(8)).unwrap();
        assert_eq!(inv, Matrix::identity(8));
    }

    #[test]
    fn inverse_times_original_is_identity() {
        let backend = GaloisBackend::new();
        let a = backend.gen_rs_matrix(14, 10);
        // A square submatrix mixing data and parity rows.
        let sub = a.select_rows(&[0, 1, 3, 7, 8, 9, 10, 11, 12, 13]);
        let inv = backend.invert_matrix(&sub).unwrap();
        assert_eq!(mat_mul(&inv, &sub), Matrix::identity(10));
        assert_eq!(mat_mul(&sub, &inv), Matrix::identity(10));
    }

    #[test]
    fn duplicate_rows_are_singular() {
        let backend = GaloisBackend::new();
        let a = backend.gen_rs_matrix(6, 4);
        let degenerate = a.select_rows(&[0, 1, 4, 4]);
        assert!(matches!(
            backend.invert_matrix(&degenerate),
            Err(EcPerfError::SingularMatrix)
        ));
    }

    #[test]
    fn zero_matrix_is_singular() {
        let backend = GaloisBackend::new();
        assert!(backend.invert_matrix(&Matrix::zero(3, 3)).is_err());
    }

    #[test]
    fn encode_with_identity_rows_copies_inputs() {
        let backend = GaloisBackend::new();
        let table = backend.init_tables(&Matrix::identity(2));
        let a = [1u8, 2, 3, 4];
        let b = [5u8, 6, 7, 8];
        let inputs: Vec<&[u8]> = vec![&a, &b];
        let mut out_a = [0u8; 4];
        let mut out_b = [0u8; 4];
        {
            let mut outputs: Vec<&mut [u8]> = vec![&mut out_a, &mut out_b];
            backend.encode(4, &table, &inputs, &mut outputs);
        }
        assert_eq!(out_a, a);
        assert_eq!(out_b, b);
    }

    #[test]
    fn encode_with_all_ones_row_is_xor() {
        let backend = GaloisBackend::new();
        let mut rows = Matrix::zero(1, 3);
        for j in 0..3 {
            rows.set(0, j, 1);
        }
        let table = backend.init_tables(&rows);
        let a = [0x0fu8; 8];
        let b = [0xf0u8; 8];
        let c = [0xaau8; 8];
        let inputs: Vec<&[u8]> = vec![&a, &b, &c];
        let mut parity = [0u8; 8];
        {
            let mut outputs: Vec<&mut [u8]> = vec![&mut parity];
            backend.encode(8, &table, &inputs, &mut outputs);
        }
        assert!(parity.iter().all(|&x| x == 0x0f ^ 0xf0 ^ 0xaa));
    }

    #[test]
    fn field_arithmetic_matches_known_values() {
        // GF(2^8) with polynomial 0x11d: 2 * 0x80 = 0x1d.
        assert_eq!(Gf::mul(2, 0x80), 0x1d);
        assert_eq!(Gf::mul(0, 0xff), 0);
        assert_eq!(Gf::div(Gf::mul(7, 13), 13), 7);
        assert_eq!(Gf::exp(2, 8), Gf::mul(2, Gf::exp(2, 7)));
    }
}
