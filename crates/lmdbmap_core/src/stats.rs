//! Storage statistics.
//!
//! Snapshots of the engine's B-tree statistics, either for the whole
//! environment ([`Environment::stat`](crate::Environment::stat)) or for one
//! table ([`TableId::stat`](crate::TableId::stat)).

/// B-tree statistics for an environment or a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    /// Size of a database page in bytes.
    pub page_size: u32,
    /// Depth of the B-tree.
    pub depth: u32,
    /// Number of internal pages.
    pub branch_pages: usize,
    /// Number of leaf pages.
    pub leaf_pages: usize,
    /// Number of overflow pages.
    pub overflow_pages: usize,
    /// Number of entries. For a multimap this counts (key, value) pairs.
    pub entries: usize,
}

impl StorageStats {
    /// Total number of pages in use.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.branch_pages + self.leaf_pages + self.overflow_pages
    }

    /// Approximate bytes in use.
    #[must_use]
    pub fn used_bytes(&self) -> u64 {
        self.total_pages() as u64 * u64::from(self.page_size)
    }
}

impl From<lmdb::Stat> for StorageStats {
    fn from(stat: lmdb::Stat) -> Self {
        Self {
            page_size: stat.page_size(),
            depth: stat.depth(),
            branch_pages: stat.branch_pages(),
            leaf_pages: stat.leaf_pages(),
            overflow_pages: stat.overflow_pages(),
            entries: stat.entries(),
        }
    }
}
