//! Environment configuration.

/// Configuration for opening an [`Environment`](crate::Environment).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    /// Maximum size of the memory map, in bytes. Writes that would grow the
    /// data file past this fail with a structural commit error.
    pub map_size: usize,

    /// Maximum number of named tables.
    pub max_tables: u32,

    /// Maximum number of concurrent read transactions.
    pub max_readers: u32,

    /// Whether to create the storage directory if it doesn't exist.
    pub create_if_missing: bool,

    /// Skip the fsync on commit. Durability is lost on OS crash, not on
    /// process crash.
    pub no_sync: bool,

    /// Tie read slots to transactions instead of threads, allowing several
    /// read transactions per thread.
    pub no_tls: bool,

    /// Open the environment read-only. Write transactions and table creation
    /// fail.
    pub read_only: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            map_size: 100 * 1024 * 1024, // 100 MiB
            max_tables: 10,
            max_readers: 126,
            create_if_missing: true,
            no_sync: false,
            no_tls: false,
            read_only: false,
        }
    }
}

impl EnvConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum map size in bytes.
    #[must_use]
    pub const fn map_size(mut self, bytes: usize) -> Self {
        self.map_size = bytes;
        self
    }

    /// Sets the maximum number of named tables.
    #[must_use]
    pub const fn max_tables(mut self, count: u32) -> Self {
        self.max_tables = count;
        self
    }

    /// Sets the maximum number of concurrent readers.
    #[must_use]
    pub const fn max_readers(mut self, count: u32) -> Self {
        self.max_readers = count;
        self
    }

    /// Sets whether to create the directory if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether commits skip the fsync.
    #[must_use]
    pub const fn no_sync(mut self, value: bool) -> Self {
        self.no_sync = value;
        self
    }

    /// Sets whether read slots are tied to transactions instead of threads.
    #[must_use]
    pub const fn no_tls(mut self, value: bool) -> Self {
        self.no_tls = value;
        self
    }

    /// Sets read-only mode.
    #[must_use]
    pub const fn read_only(mut self, value: bool) -> Self {
        self.read_only = value;
        self
    }

    pub(crate) fn environment_flags(&self) -> lmdb::EnvironmentFlags {
        let mut flags = lmdb::EnvironmentFlags::empty();
        if self.no_sync {
            flags |= lmdb::EnvironmentFlags::NO_SYNC;
        }
        if self.no_tls {
            flags |= lmdb::EnvironmentFlags::NO_TLS;
        }
        if self.read_only {
            flags |= lmdb::EnvironmentFlags::READ_ONLY;
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = EnvConfig::default();
        assert_eq!(config.map_size, 100 * 1024 * 1024);
        assert_eq!(config.max_tables, 10);
        assert_eq!(config.max_readers, 126);
        assert!(config.create_if_missing);
        assert!(!config.read_only);
        assert!(config.environment_flags().is_empty());
    }

    #[test]
    fn builder_pattern() {
        let config = EnvConfig::new()
            .map_size(1 << 20)
            .max_tables(4)
            .no_sync(true)
            .read_only(true);

        assert_eq!(config.map_size, 1 << 20);
        assert_eq!(config.max_tables, 4);
        let flags = config.environment_flags();
        assert!(flags.contains(lmdb::EnvironmentFlags::NO_SYNC));
        assert!(flags.contains(lmdb::EnvironmentFlags::READ_ONLY));
        assert!(!flags.contains(lmdb::EnvironmentFlags::NO_TLS));
    }
}
