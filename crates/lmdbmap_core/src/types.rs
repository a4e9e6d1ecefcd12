//! Core type definitions for lmdbmap.

use std::fmt;

/// Identifier for a transaction, used in log records.
///
/// Transaction IDs are monotonically increasing per environment and never
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionId(pub u64);

impl TransactionId {
    /// Creates a new transaction ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn:{}", self.0)
    }
}

/// Whether a table holds one value per key or a sorted set of values per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    /// One value per key.
    Map,
    /// Any number of distinct values per key, sorted by encoded value bytes.
    Multimap,
}

impl TableKind {
    /// Returns true if keys may carry more than one value.
    #[must_use]
    pub const fn allows_duplicates(self) -> bool {
        matches!(self, Self::Multimap)
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Map => f.write_str("map"),
            Self::Multimap => f.write_str("multimap"),
        }
    }
}
