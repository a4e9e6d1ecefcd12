//! Transactions.
//!
//! A [`Transaction`] bounds every read and write:
//! - **Read-only** transactions see a stable snapshot taken when they begin,
//!   and any number of them may run concurrently.
//! - **Read-write** transactions are serialized by the engine's write lock.
//!   Their changes become visible to new readers on commit.
//!
//! Dropping an unfinished transaction aborts it.

mod state;

pub use state::Transaction;
