//! Benchmark utilities.

#![warn(missing_docs)]

use lmdbmap_core::{EnvConfig, Environment};
use rand::seq::SliceRandom;
use rand::Rng;
use tempfile::TempDir;

/// Generate random value data of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate `count` distinct keys in random order.
pub fn shuffled_keys(count: u64) -> Vec<u64> {
    let mut keys: Vec<u64> = (0..count).collect();
    keys.shuffle(&mut rand::thread_rng());
    keys
}

/// An environment in a temporary directory, removed on drop.
pub struct BenchEnv {
    /// The environment.
    pub env: Environment,
    _dir: TempDir,
}

impl BenchEnv {
    /// Opens a fresh environment. Commits skip fsync so results measure the
    /// B-tree rather than the disk.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let config = EnvConfig::new().map_size(1 << 30).no_sync(true);
        let env = Environment::open(dir.path(), config).expect("Failed to open environment");
        Self { env, _dir: dir }
    }
}

impl Default for BenchEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffled_keys_is_a_permutation() {
        let mut keys = shuffled_keys(100);
        keys.sort_unstable();
        assert_eq!(keys, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn random_data_has_requested_size() {
        assert_eq!(random_data(33).len(), 33);
    }
}
