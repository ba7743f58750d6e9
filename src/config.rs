// ⚙️ Runtime configuration, read from the environment with defaults

use crate::store::{ImportMode, LedgerStore};
use std::path::PathBuf;

pub const DEFAULT_DATA_FILE: &str = "data.json";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_STATIC_DIR: &str = "web";

#[derive(Debug, Clone)]
pub struct Config {
    /// Backing JSON file (`LEDGER_DATA_FILE`)
    pub data_file: PathBuf,
    /// host:port to listen on (`LEDGER_BIND_ADDR`)
    pub bind_addr: String,
    /// Directory served under /static (`LEDGER_STATIC_DIR`)
    pub static_dir: PathBuf,
    /// Validate imports before overwriting the file (`LEDGER_STAGED_IMPORT`)
    pub staged_import: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            staged_import: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their default
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let staged_import = match lookup("LEDGER_STAGED_IMPORT") {
            Some(raw) => parse_flag(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "LEDGER_STAGED_IMPORT is not a boolean; using false");
                false
            }),
            None => defaults.staged_import,
        };

        Self {
            data_file: lookup("LEDGER_DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_file),
            bind_addr: lookup("LEDGER_BIND_ADDR").unwrap_or(defaults.bind_addr),
            static_dir: lookup("LEDGER_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            staged_import,
        }
    }

    pub fn import_mode(&self) -> ImportMode {
        if self.staged_import {
            ImportMode::Staged
        } else {
            ImportMode::Overwrite
        }
    }

    /// Store over the configured file
    pub fn store(&self) -> LedgerStore {
        LedgerStore::new(self.data_file.clone()).with_import_mode(self.import_mode())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = Config::from_lookup(|_| None);

        assert_eq!(config.data_file, PathBuf::from("data.json"));
        assert_eq!(config.bind_addr, "0.0.0.0:5000");
        assert_eq!(config.import_mode(), ImportMode::Overwrite);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("LEDGER_DATA_FILE", "/tmp/cuentas.json"),
            ("LEDGER_BIND_ADDR", "127.0.0.1:8080"),
            ("LEDGER_STATIC_DIR", "assets"),
            ("LEDGER_STAGED_IMPORT", "yes"),
        ]));

        assert_eq!(config.data_file, PathBuf::from("/tmp/cuentas.json"));
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.static_dir, PathBuf::from("assets"));
        assert_eq!(config.store().import_mode(), ImportMode::Staged);
    }

    #[test]
    fn test_bad_flag_falls_back_to_false() {
        let config = Config::from_lookup(lookup_from(&[("LEDGER_STAGED_IMPORT", "maybe")]));

        assert!(!config.staged_import);
    }
}
