// Copyright 2024 Saorsa Labs
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Throughput statistics

use serde::{Deserialize, Serialize};

/// Mean and population standard deviation of a sample series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
}

impl Stats {
    /// Population statistics (variance divided by N). Empty input yields
    /// zeroes.
    pub fn of(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self {
                mean: 0.0,
                std_dev: 0.0,
            };
        }
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        Self {
            mean,
            std_dev: variance.sqrt(),
        }
    }
}

/// Convert elapsed-microsecond samples into throughput samples, in place.
///
/// Bytes per microsecond is numerically megabytes per second.
pub fn to_throughput(samples: &mut [f64], payload_bytes: u64) {
    let size = payload_bytes as f64;
    for s in samples.iter_mut() {
        *s = size / *s;
    }
}
