use std::env;

use crate::{CONCURRENT_THREADS, SCAN_BATCH_SIZE};

/// Tuning of a `TableFilterRunner`. Unset values take the crate defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Configuration {
    pub scan_batch_size: Option<usize>,
    pub concurrent_threads: Option<usize>,
    pub prefer_indexed_rules: Option<bool>,
}

impl Configuration {
    /// Reads `WHAISDB_SCAN_BATCH_SIZE`, `WHAISDB_CONCURRENT_THREADS` and
    /// `WHAISDB_PREFER_INDEXED_RULES`; unparsable values are ignored.
    pub fn from_env() -> Self {
        fn read<T: std::str::FromStr>(key: &str) -> Option<T> {
            let raw = env::var(key).ok()?;
            match raw.trim().parse::<T>() {
                Ok(v) => Some(v),
                Err(_) => {
                    log::warn!("Ignoring invalid value '{}' for {}", raw, key);
                    None
                }
            }
        }

        Configuration {
            scan_batch_size: read("WHAISDB_SCAN_BATCH_SIZE"),
            concurrent_threads: read("WHAISDB_CONCURRENT_THREADS"),
            prefer_indexed_rules: read("WHAISDB_PREFER_INDEXED_RULES"),
        }
    }

    /// Rows a scan rule evaluates per batch.
    pub fn scan_batch_size(&self) -> usize {
        self.scan_batch_size.unwrap_or(SCAN_BATCH_SIZE).max(1)
    }

    pub fn concurrent_threads(&self) -> usize {
        self.concurrent_threads.unwrap_or(CONCURRENT_THREADS).max(1)
    }

    /// Run index backed rules before scanning ones.
    pub fn prefer_indexed_rules(&self) -> bool {
        self.prefer_indexed_rules.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_unset_values() {
        let config = Configuration::default();
        assert_eq!(config.scan_batch_size(), SCAN_BATCH_SIZE);
        assert_eq!(config.concurrent_threads(), CONCURRENT_THREADS);
        assert!(config.prefer_indexed_rules());

        let config = Configuration {
            scan_batch_size: Some(0),
            concurrent_threads: Some(0),
            prefer_indexed_rules: Some(false),
        };
        assert_eq!(config.scan_batch_size(), 1);
        assert_eq!(config.concurrent_threads(), 1);
        assert!(!config.prefer_indexed_rules());
    }
}
