//! Stress tests for lmdbmap.
//!
//! These runs exercise tables under sustained load and under concurrent
//! readers while a writer commits.

use lmdbmap_core::{Environment, Map};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of operations to perform.
    pub operations: usize,
    /// Number of concurrent reader threads.
    pub threads: usize,
    /// Size of each value in bytes.
    pub value_size: usize,
    /// Number of distinct keys.
    pub key_count: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 10_000,
            threads: 4,
            value_size: 256,
            key_count: 1_000,
        }
    }
}

fn open_table(env: &Environment) -> Map<u64, Vec<u8>> {
    Map::open(env, "stress").expect("Failed to open stress table")
}

/// Run a sequential write stress test, one transaction per put.
pub fn stress_sequential_writes(env: &Environment, config: &StressConfig) -> StressTestResult {
    let map = open_table(env);
    let value = vec![0xABu8; config.value_size];

    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for i in 0..config.operations {
        let key = (i % config.key_count) as u64;
        let result = env.begin_write().and_then(|mut txn| {
            map.put(&mut txn, &key, &value)?;
            txn.commit()
        });

        match result {
            Ok(()) => successful += 1,
            Err(_) => failed += 1,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

/// Run a sequential read stress test, one read transaction per get.
pub fn stress_sequential_reads(env: &Environment, config: &StressConfig) -> StressTestResult {
    let map = open_table(env);
    populate(env, &map, config, 0);

    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for i in 0..config.operations {
        let key = (i % config.key_count) as u64;
        let result = env.begin_read().and_then(|txn| map.get(&txn, &key));

        match result {
            Ok(Some(_)) => successful += 1,
            Ok(None) | Err(_) => failed += 1,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

/// Run a batched write stress test, many puts per transaction.
pub fn stress_large_transactions(env: &Environment, config: &StressConfig) -> StressTestResult {
    let map = open_table(env);
    let value = vec![0xABu8; config.value_size];
    let batch_size = 100; // Puts per transaction

    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for batch in 0..(config.operations / batch_size) {
        let result = env.begin_write().and_then(|mut txn| {
            for i in 0..batch_size {
                let key = ((batch * batch_size + i) % config.key_count) as u64;
                map.put(&mut txn, &key, &value)?;
            }
            txn.commit()
        });

        match result {
            Ok(()) => successful += batch_size,
            Err(_) => failed += batch_size,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

/// Run readers concurrently with a writer.
///
/// The writer repeatedly rewrites every key with the next generation number
/// in a single transaction. Each reader scans the table and counts a failure
/// if it ever sees values from two generations in one snapshot.
pub fn stress_readers_during_writes(env: &Environment, config: &StressConfig) -> StressTestResult {
    let map = open_table(env);
    populate(env, &map, config, 0);

    let successful = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let writer_done = AtomicBool::new(false);
    let generations = (config.operations / config.key_count.max(1)).max(1);

    let start = Instant::now();

    thread::scope(|s| {
        for _ in 0..config.threads {
            s.spawn(|| {
                while !writer_done.load(Ordering::Acquire) {
                    if scan_is_consistent(env, &map) {
                        successful.fetch_add(1, Ordering::Relaxed);
                    } else {
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }

        for generation in 1..=generations {
            populate(env, &map, config, generation as u64);
        }
        writer_done.store(true, Ordering::Release);
    });

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Writes every key with a value tagged by `generation`, in one transaction.
fn populate(env: &Environment, map: &Map<u64, Vec<u8>>, config: &StressConfig, generation: u64) {
    let mut value = vec![0u8; config.value_size.max(8)];
    value[..8].copy_from_slice(&generation.to_be_bytes());

    let mut txn = env.begin_write().expect("Failed to begin write");
    for key in 0..config.key_count as u64 {
        map.put(&mut txn, &key, &value).expect("Failed to put");
    }
    txn.commit().expect("Failed to commit");
}

fn scan_is_consistent(env: &Environment, map: &Map<u64, Vec<u8>>) -> bool {
    let Ok(txn) = env.begin_read() else {
        return false;
    };
    let Ok(iter) = map.begin(&txn) else {
        return false;
    };

    let mut generation = None;
    for entry in iter {
        let Ok((_, value)) = entry else {
            return false;
        };
        let tag = value.get(..8).map(<[u8]>::to_vec);
        match &generation {
            None => generation = Some(tag),
            Some(seen) if *seen == tag => {}
            Some(_) => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestEnv;

    #[test]
    fn test_sequential_writes() {
        let test_env = TestEnv::new();
        let config = StressConfig {
            operations: 500,
            value_size: 64,
            ..Default::default()
        };

        let result = stress_sequential_writes(&test_env, &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 500);
    }

    #[test]
    fn test_sequential_reads() {
        let test_env = TestEnv::new();
        let config = StressConfig {
            operations: 1_000,
            key_count: 100,
            value_size: 64,
            ..Default::default()
        };

        let result = stress_sequential_reads(&test_env, &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 1_000);
    }

    #[test]
    fn test_large_transactions() {
        let test_env = TestEnv::new();
        let config = StressConfig {
            operations: 1_000,
            value_size: 64,
            ..Default::default()
        };

        let result = stress_large_transactions(&test_env, &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 1_000);
    }

    #[test]
    fn test_readers_see_consistent_snapshots() {
        let test_env = TestEnv::new();
        let config = StressConfig {
            operations: 2_000,
            threads: 4,
            key_count: 200,
            value_size: 32,
        };

        let result = stress_readers_during_writes(&test_env, &config);
        assert_eq!(result.failed_ops, 0);
    }
}
