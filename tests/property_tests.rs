// Copyright 2024 Saorsa Labs
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Property-based tests for the erasure-coding harness

use proptest::prelude::*;
use saorsa_ec_perf::harness::encode_and_recover;
use saorsa_ec_perf::{create_backend, BenchConfig, Stats};

/// Valid (k, p, erasure-set) shapes: erasures are a distinct subset of the
/// data rows no larger than the parity count.
fn config_strategy() -> impl Strategy<Value = BenchConfig> {
    (1usize..=10, 1usize..=4)
        .prop_flat_map(|(k, p)| {
            let nerrs = 0..=p.min(k);
            (Just(k), Just(p), nerrs)
        })
        .prop_flat_map(|(k, p, nerrs)| {
            (
                Just(k),
                Just(p),
                proptest::sample::subsequence((0..k).collect::<Vec<_>>(), nerrs),
                16usize..=256,
                any::<u64>(),
            )
        })
        .prop_map(|(k, p, erasures, shard_size, seed)| BenchConfig {
            data_shards: k,
            parity_shards: p,
            erasures,
            iterations: 2,
            payload_size: k * shard_size,
            seed,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn erased_shards_always_recover(config in config_strategy()) {
        let backend = create_backend();
        let (shards, recovered) = encode_and_recover(&config, backend.as_ref()).unwrap();
        for (i, &idx) in config.erasures.iter().enumerate() {
            prop_assert_eq!(recovered.shard(i), shards.shard(idx));
        }
    }

    #[test]
    fn full_run_reports_sane_statistics(config in config_strategy()) {
        let report = saorsa_ec_perf::run(&config).unwrap();
        prop_assert!(report.encode.mean > 0.0);
        prop_assert!(report.encode.std_dev >= 0.0);
        prop_assert!(report.decode.mean >= 0.0);
        prop_assert!(report.decode.std_dev >= 0.0);
        prop_assert_eq!(report.payload_bytes, config.payload_size as u64);
    }

    #[test]
    fn throughput_of_constant_series_is_exact(
        duration_us in 1.0f64..10_000.0,
        len in 1usize..200,
        payload in 1u64..1_000_000,
    ) {
        let mut samples = vec![duration_us; len];
        saorsa_ec_perf::stats::to_throughput(&mut samples, payload);
        let stats = Stats::of(&samples);
        prop_assert!((stats.mean - payload as f64 / duration_us).abs() < 1e-6 * stats.mean.abs().max(1.0));
        prop_assert!(stats.std_dev.abs() < 1e-9 * stats.mean.abs().max(1.0));
    }
}
