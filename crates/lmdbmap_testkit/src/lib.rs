//! # lmdbmap Testkit
//!
//! Test utilities for lmdbmap.
//!
//! This crate provides:
//! - Temporary environment fixtures
//! - Property-based operation generators using proptest
//! - Model-checked harnesses comparing tables against `BTreeMap`
//! - Stress testing utilities
//!
//! ## Usage
//!
//! ```rust
//! use lmdbmap_testkit::prelude::*;
//! use lmdbmap_core::Map;
//!
//! with_temp_env(|env| {
//!     let map: Map<u32, u32> = Map::open(env, "test").unwrap();
//!     let txn = env.begin_read().unwrap();
//!     assert!(map.is_empty(&txn).unwrap());
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod model;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::model::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use model::*;
pub use stress::*;
