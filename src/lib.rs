// Copyright 2024 Saorsa Labs
// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Saorsa EC-Perf - Erasure Coding Micro-benchmark
//!
//! This crate measures the throughput of systematic Reed-Solomon erasure
//! encoding and decoding over GF(2^8). It times repeated encode passes over a
//! set of randomly filled data shards, rebuilds the erased shards through the
//! standard inverted-submatrix recovery construction, times the decode passes,
//! verifies the recovered shards byte-for-byte against the originals, and
//! reports mean and standard-deviation throughput in MB/sec.
//!
//! The Galois-field mathematics itself lives in an external coding library and
//! is bound through the [`CodingBackend`] trait; this crate only supplies the
//! glue: buffer management, erasure patterns, timing loops and statistics.
//!
//! ## Features
//! - Systematic Vandermonde-style generator matrices
//! - 64-byte aligned shard buffers for vectorized kernel access
//! - Deterministic, seeded source data
//! - Embeddable: the whole pipeline is a library call returning a report

use thiserror::Error;

pub mod backends;
pub mod buffers;
pub mod config;
pub mod harness;
pub mod matrix;
pub mod stats;

pub use backends::{create_backend, CodingBackend, CodingTable};
pub use config::{BenchConfig, MAX_SHARDS};
pub use harness::{run, BenchReport};
pub use matrix::{Matrix, RecoveryPlan};
pub use stats::Stats;

/// Errors that can occur while running the benchmark harness
#[derive(Debug, Error)]
pub enum EcPerfError {
    #[error("invalid configuration: m={m}, k={k}, nerrs={nerrs}")]
    InvalidConfiguration { m: usize, k: usize, nerrs: usize },

    #[error("aligned allocation of {size} bytes failed")]
    AllocationFailure { size: usize },

    #[error("matrix is not invertible")]
    SingularMatrix,

    #[error("recovered shard {index} differs from its source (m={m}, k={k}, nerrs={nerrs})")]
    ConsistencyFailure {
        index: usize,
        m: usize,
        k: usize,
        nerrs: usize,
    },
}

pub type Result<T> = std::result::Result<T, EcPerfError>;
