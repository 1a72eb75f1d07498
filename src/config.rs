// Copyright 2024 Saorsa Labs
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Benchmark parameters and bounds validation

use crate::{EcPerfError, Result};
use serde::{Deserialize, Serialize};

/// Upper bound on shard counts, both for the data-shard count and for the
/// total (data + parity) count.
pub const MAX_SHARDS: usize = 32;

/// Parameters for one benchmark run.
///
/// The defaults give the standard scenario: RS(14,10) with data shards
/// 2, 4, 5 and 6 erased, 1 MiB per shard, 1000 timed iterations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Number of data shards (k)
    pub data_shards: usize,
    /// Number of parity shards (p); total shards m = k + p
    pub parity_shards: usize,
    /// Data-shard indices treated as lost during the decode phase
    pub erasures: Vec<usize>,
    /// Number of timed passes per phase
    pub iterations: usize,
    /// Total payload size in bytes, split evenly across the data shards
    pub payload_size: usize,
    /// Seed for the source-data PRNG
    pub seed: u64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            data_shards: 10,
            parity_shards: 4,
            erasures: vec![2, 4, 5, 6],
            iterations: 1000,
            payload_size: 10 * 1024 * 1024,
            seed: 0x5eed,
        }
    }
}

impl BenchConfig {
    /// Total number of shards (m = k + p)
    pub fn total_shards(&self) -> usize {
        self.data_shards + self.parity_shards
    }

    /// Bytes per shard
    pub fn shard_size(&self) -> usize {
        self.payload_size / self.data_shards.max(1)
    }

    /// Check the shard counts and erasure pattern against the supported
    /// bounds. Runs before any buffer is allocated.
    pub fn validate(&self) -> Result<()> {
        let k = self.data_shards;
        let p = self.parity_shards;
        let m = k + p;
        let nerrs = self.erasures.len();

        let invalid = EcPerfError::InvalidConfiguration { m, k, nerrs };

        if k == 0 || k > MAX_SHARDS || m > MAX_SHARDS || nerrs > p {
            return Err(invalid);
        }
        if self.shard_size() == 0 {
            return Err(invalid);
        }
        // Only data-shard erasures are meaningful to the recovery
        // construction, and repeating an index would alias two outputs.
        for (i, &idx) in self.erasures.iter().enumerate() {
            if idx >= k || self.erasures[..i].contains(&idx) {
                return Err(invalid);
            }
        }

        Ok(())
    }
}
