// Copyright 2024 Saorsa Labs
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Command-line entry point for the erasure-coding micro-benchmark.
//!
//! Runs the default scenario (RS(14,10), erasures {2,4,5,6}, 1 MiB shards,
//! 1000 iterations) and prints throughput statistics. Exits non-zero on any
//! configuration, allocation, inversion or consistency failure.

use anyhow::Result;
use saorsa_ec_perf::{harness, BenchConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = BenchConfig::default();
    let report = harness::run(&config)?;
    println!("{report}");

    Ok(())
}
