//! # lmdbmap Core
//!
//! Ordered maps and multimaps over LMDB.
//!
//! This crate provides:
//! - [`Environment`]: the handle to one LMDB directory
//! - [`Transaction`]: read-only snapshots and serialized read-write units
//! - [`Map`] and [`Multimap`]: typed tables with point lookups, bound queries
//!   and cursor iteration
//!
//! Every table operation takes its transaction explicitly. Iterators borrow
//! the transaction, so none can outlive a commit or abort.
//!
//! ```rust,no_run
//! use lmdbmap_core::{EnvConfig, Environment, Multimap};
//!
//! let env = Environment::open("/tmp/lmdbmap-tags", EnvConfig::default())?;
//! let tags: Multimap<u64, String> = Multimap::open(&env, "tags")?;
//!
//! let mut txn = env.begin_write()?;
//! tags.insert(&mut txn, &1, &"red".to_string())?;
//! tags.insert(&mut txn, &1, &"blue".to_string())?;
//! txn.commit()?;
//!
//! let txn = env.begin_read()?;
//! assert_eq!(tags.get(&txn, &1)?, vec!["blue", "red"]);
//! # Ok::<(), lmdbmap_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collection;
mod config;
mod cursor;
mod environment;
mod error;
mod stats;
mod table;
mod transaction;
mod types;

pub use collection::{Map, MapIter, Multimap, MultimapIter};
pub use config::EnvConfig;
pub use cursor::{RawEntries, RawEntry};
pub use environment::Environment;
pub use error::{CommitErrorKind, CoreError, CoreResult};
pub use stats::StorageStats;
pub use table::TableId;
pub use transaction::Transaction;
pub use types::{TableKind, TransactionId};

pub use lmdbmap_codec::{Cbor, CodecError, Decode, Encode, OrderedKey};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
