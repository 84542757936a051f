//! Row store configuration.

use std::path::{Path, PathBuf};

/// Configuration for the sled-backed row store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// On-disk location; `None` means a temporary store.
    pub path: Option<PathBuf>,
    /// sled write cache capacity in bytes.
    pub cache_capacity: u64,
}

impl StoreConfig {
    /// Create a configuration for an on-disk store.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            cache_capacity: 64 * 1024 * 1024,
        }
    }

    /// Create a configuration for a temporary store, removed on drop.
    pub fn temporary() -> Self {
        Self {
            path: None,
            cache_capacity: 64 * 1024 * 1024,
        }
    }

    /// Set the sled cache capacity.
    pub fn cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = bytes;
        self
    }

    /// Build the sled configuration.
    pub fn to_sled_config(&self) -> sled::Config {
        let config = sled::Config::new().cache_capacity(self.cache_capacity);
        match &self.path {
            Some(path) => config.path(path),
            None => config.temporary(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporary_config() {
        let config = StoreConfig::temporary();
        assert!(config.path.is_none());
    }

    #[test]
    fn test_path_config() {
        let config = StoreConfig::new("/tmp/chronodb-test");
        assert_eq!(config.path.as_deref(), Some(Path::new("/tmp/chronodb-test")));
    }
}
