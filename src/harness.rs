// Copyright 2024 Saorsa Labs
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The one-shot benchmark pipeline
//!
//! Allocation, matrix setup and table expansion all happen strictly outside
//! the timed regions; each timed sample brackets exactly one call into the
//! coding primitive.

use crate::backends::{self, CodingBackend, CodingTable};
use crate::buffers::ShardSet;
use crate::config::BenchConfig;
use crate::matrix;
use crate::stats::{self, Stats};
use crate::{EcPerfError, Result};
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

/// Results of one benchmark run.
#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub data_shards: usize,
    pub parity_shards: usize,
    pub erasures: usize,
    pub shard_size: usize,
    /// Bytes of source data processed per pass (k * shard_size)
    pub payload_bytes: u64,
    pub iterations: usize,
    /// Encode throughput in MB/sec
    pub encode: Stats,
    /// Decode throughput in MB/sec
    pub decode: Stats,
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "erasure_code_perf: data size = {}x{} {}",
            self.data_shards, self.shard_size, self.erasures
        )?;
        writeln!(
            f,
            "data size = {}, iter = {}",
            self.payload_bytes, self.iterations
        )?;
        writeln!(
            f,
            "ENC throughput = {:.6} MB/sec, SD = {:.6}",
            self.encode.mean, self.encode.std_dev
        )?;
        write!(
            f,
            "DEC throughput = {:.6} MB/sec, SD = {:.6}",
            self.decode.mean, self.decode.std_dev
        )
    }
}

/// One timed pass of the coding primitive, returning elapsed microseconds.
fn timed_pass(
    backend: &dyn CodingBackend,
    len: usize,
    table: &CodingTable,
    inputs: &[&[u8]],
    outputs: &mut [&mut [u8]],
) -> f64 {
    let start = Instant::now();
    backend.encode(len, table, inputs, outputs);
    start.elapsed().as_secs_f64() * 1e6
}

/// Run the full benchmark with the default backend.
pub fn run(config: &BenchConfig) -> Result<BenchReport> {
    let backend = backends::create_backend();
    run_with_backend(config, backend.as_ref())
}

/// Run the full benchmark against a specific backend.
pub fn run_with_backend(config: &BenchConfig, backend: &dyn CodingBackend) -> Result<BenchReport> {
    config.validate()?;

    let k = config.data_shards;
    let p = config.parity_shards;
    let m = config.total_shards();
    let nerrs = config.erasures.len();
    let shard_size = config.shard_size();
    let payload_bytes = (k * shard_size) as u64;

    info!(
        backend = backend.name(),
        k,
        p,
        nerrs,
        shard_size,
        iterations = config.iterations,
        "starting erasure-code benchmark"
    );

    let coding = backend.gen_rs_matrix(m, k);
    let parity_rows: Vec<usize> = (k..m).collect();
    let encode_table = backend.init_tables(&coding.select_rows(&parity_rows));

    let mut shards = ShardSet::allocate(m, shard_size)?;
    let mut recovered = ShardSet::allocate(p, shard_size)?;
    shards.fill_random(k, config.seed);

    let mut encode_us = Vec::with_capacity(config.iterations);
    {
        let (data, parity) = shards.split_at_mut(k);
        let inputs: Vec<&[u8]> = data.iter().map(|b| &b[..]).collect();
        let mut outputs: Vec<&mut [u8]> = parity.iter_mut().map(|b| &mut b[..]).collect();
        for _ in 0..config.iterations {
            encode_us.push(timed_pass(
                backend,
                shard_size,
                &encode_table,
                &inputs,
                &mut outputs,
            ));
        }
    }
    debug!(samples = encode_us.len(), "encode loop complete");

    let plan = matrix::build_recovery_plan(backend, &coding, &config.erasures, k)?;
    let decode_table = backend.init_tables(&plan.matrix);

    let mut decode_us = Vec::with_capacity(config.iterations);
    if nerrs > 0 {
        let inputs: Vec<&[u8]> = plan.survivors.iter().map(|&i| shards.shard(i)).collect();
        let (outputs, _) = recovered.split_at_mut(nerrs);
        let mut outputs: Vec<&mut [u8]> = outputs.iter_mut().map(|b| &mut b[..]).collect();
        for _ in 0..config.iterations {
            decode_us.push(timed_pass(
                backend,
                shard_size,
                &decode_table,
                &inputs,
                &mut outputs,
            ));
        }
    }
    debug!(samples = decode_us.len(), "decode loop complete");

    verify_recovery(config, &shards, &recovered)?;

    stats::to_throughput(&mut encode_us, payload_bytes);
    stats::to_throughput(&mut decode_us, payload_bytes);

    let report = BenchReport {
        data_shards: k,
        parity_shards: p,
        erasures: nerrs,
        shard_size,
        payload_bytes,
        iterations: config.iterations,
        encode: Stats::of(&encode_us),
        decode: Stats::of(&decode_us),
    };

    info!(
        enc_mean = report.encode.mean,
        dec_mean = report.decode.mean,
        "benchmark complete"
    );

    Ok(report)
}

/// Byte-compare every recovered shard against its original. A throughput
/// figure is meaningless if the coding path is broken, so a mismatch fails
/// the whole run.
fn verify_recovery(config: &BenchConfig, shards: &ShardSet, recovered: &ShardSet) -> Result<()> {
    for (i, &idx) in config.erasures.iter().enumerate() {
        if recovered.shard(i) != shards.shard(idx) {
            return Err(EcPerfError::ConsistencyFailure {
                index: idx,
                m: config.total_shards(),
                k: config.data_shards,
                nerrs: config.erasures.len(),
            });
        }
    }
    Ok(())
}

/// Convenience for tests and embedders: encode once and rebuild the erased
/// shards once, without the timing loops, returning the recovered shards.
pub fn encode_and_recover(
    config: &BenchConfig,
    backend: &dyn CodingBackend,
) -> Result<(ShardSet, ShardSet)> {
    config.validate()?;

    let k = config.data_shards;
    let m = config.total_shards();
    let shard_size = config.shard_size();

    let coding = backend.gen_rs_matrix(m, k);
    let parity_rows: Vec<usize> = (k..m).collect();
    let encode_table = backend.init_tables(&coding.select_rows(&parity_rows));

    let mut shards = ShardSet::allocate(m, shard_size)?;
    let mut recovered = ShardSet::allocate(config.parity_shards, shard_size)?;
    shards.fill_random(k, config.seed);

    {
        let (data, parity) = shards.split_at_mut(k);
        let inputs: Vec<&[u8]> = data.iter().map(|b| &b[..]).collect();
        let mut outputs: Vec<&mut [u8]> = parity.iter_mut().map(|b| &mut b[..]).collect();
        backend.encode(shard_size, &encode_table, &inputs, &mut outputs);
    }

    let plan = matrix::build_recovery_plan(backend, &coding, &config.erasures, k)?;
    if !config.erasures.is_empty() {
        let decode_table = backend.init_tables(&plan.matrix);
        let inputs: Vec<&[u8]> = plan.survivors.iter().map(|&i| shards.shard(i)).collect();
        let (outputs, _) = recovered.split_at_mut(config.erasures.len());
        let mut outputs: Vec<&mut [u8]> = outputs.iter_mut().map(|b| &mut b[..]).collect();
        backend.encode(shard_size, &decode_table, &inputs, &mut outputs);
    }

    verify_recovery(config, &shards, &recovered)?;
    Ok((shards, recovered))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> BenchConfig {
        BenchConfig {
            data_shards: 5,
            parity_shards: 3,
            erasures: vec![1, 4],
            iterations: 5,
            payload_size: 5 * 512,
            seed: 1,
        }
    }

    #[test]
    fn run_produces_consistent_report() {
        let report = run(&small_config()).unwrap();
        assert_eq!(report.data_shards, 5);
        assert_eq!(report.parity_shards, 3);
        assert_eq!(report.erasures, 2);
        assert_eq!(report.payload_bytes, 5 * 512);
        assert!(report.encode.mean > 0.0);
        assert!(report.decode.mean > 0.0);
        assert!(report.encode.std_dev >= 0.0);
        assert!(report.decode.std_dev >= 0.0);
    }

    #[test]
    fn run_rejects_invalid_config() {
        let mut config = small_config();
        config.erasures = vec![0, 1, 2, 3]; // more erasures than parity
        assert!(matches!(
            run(&config),
            Err(EcPerfError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn no_erasures_reports_zero_decode_stats() {
        let mut config = small_config();
        config.erasures.clear();
        let report = run(&config).unwrap();
        assert_eq!(report.decode.mean, 0.0);
        assert_eq!(report.decode.std_dev, 0.0);
        assert!(report.encode.mean > 0.0);
    }

    #[test]
    fn report_display_carries_units() {
        let report = run(&small_config()).unwrap();
        let text = report.to_string();
        assert!(text.contains("ENC throughput"));
        assert!(text.contains("DEC throughput"));
        assert!(text.contains("MB/sec"));
        assert!(text.contains("iter = 5"));
    }
}
