//! Test fixtures and environment helpers.
//!
//! Provides temporary environments that clean up after themselves and
//! pre-populated scenarios.

use lmdbmap_core::{EnvConfig, Environment};
use std::path::Path;
use tempfile::TempDir;

/// A test environment with automatic cleanup.
pub struct TestEnv {
    /// The environment instance.
    pub env: Environment,
    /// Dropped after `env`, removing the directory.
    _temp_dir: TempDir,
}

impl TestEnv {
    /// Creates an environment in a fresh temporary directory.
    pub fn new() -> Self {
        Self::with_config(Self::default_config())
    }

    /// Creates an environment with a custom configuration.
    pub fn with_config(config: EnvConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let env = Environment::open(temp_dir.path(), config).expect("Failed to open environment");
        Self {
            env,
            _temp_dir: temp_dir,
        }
    }

    /// Configuration used by [`TestEnv::new`]: small map, no fsync.
    pub fn default_config() -> EnvConfig {
        EnvConfig::new().map_size(64 * 1024 * 1024).no_sync(true)
    }

    /// Returns the storage directory.
    pub fn path(&self) -> &Path {
        self.env.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestEnv {
    type Target = Environment;

    fn deref(&self) -> &Self::Target {
        &self.env
    }
}

/// Runs a test with a temporary environment.
///
/// # Example
///
/// ```rust
/// use lmdbmap_testkit::with_temp_env;
///
/// with_temp_env(|env| {
///     assert!(env.table_names().unwrap().is_empty());
/// });
/// ```
pub fn with_temp_env<F, R>(f: F) -> R
where
    F: FnOnce(&Environment) -> R,
{
    let test_env = TestEnv::new();
    f(&test_env.env)
}

/// Runs a test with a temporary environment opened with `config`.
pub fn with_temp_env_config<F, R>(config: EnvConfig, f: F) -> R
where
    F: FnOnce(&Environment) -> R,
{
    let test_env = TestEnv::with_config(config);
    f(&test_env.env)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use lmdbmap_core::{Cbor, Map, Multimap};
    use serde::{Deserialize, Serialize};

    /// Structured value used by scenarios.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Record {
        /// Position the record was written at.
        pub index: u64,
        /// Free-form label.
        pub label: String,
    }

    impl Record {
        /// Creates the record written at `index`.
        pub fn numbered(index: u64) -> Self {
            Self {
                index,
                label: format!("record-{index}"),
            }
        }
    }

    /// Creates an environment with a map of `count` records keyed `0..count`.
    pub fn populated_map(count: u64) -> (TestEnv, Map<u64, Cbor<Record>>) {
        let test_env = TestEnv::new();
        let map = Map::open(&test_env, "records").expect("Failed to open map");

        let mut txn = test_env.begin_write().expect("Failed to begin");
        for i in 0..count {
            map.put(&mut txn, &i, &Cbor(Record::numbered(i)))
                .expect("Failed to put record");
        }
        txn.commit().expect("Failed to commit");

        (test_env, map)
    }

    /// Creates an environment with a multimap holding `values_per_key`
    /// values for each of `keys` keys.
    pub fn populated_multimap(keys: u32, values_per_key: u32) -> (TestEnv, Multimap<u32, u32>) {
        let test_env = TestEnv::new();
        let multimap = Multimap::open(&test_env, "groups").expect("Failed to open multimap");

        let mut txn = test_env.begin_write().expect("Failed to begin");
        for key in 0..keys {
            for value in 0..values_per_key {
                multimap
                    .insert(&mut txn, &key, &value)
                    .expect("Failed to insert pair");
            }
        }
        txn.commit().expect("Failed to commit");

        (test_env, multimap)
    }
}
