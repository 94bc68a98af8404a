//! Where the tables live and how the layout is seeded.
//!
//! Environment first, then command-line flags, then defaults:
//!
//! | env                   | flag         | default |
//! |-----------------------|--------------|---------|
//! | `CONNECTOME_DATA_DIR` | `--data-dir` | `data`  |
//! | `CONNECTOME_PREFS`    | `--prefs`    | none    |
//! | `CONNECTOME_SEED`     | `--seed`     | `42`    |

use std::env;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::connectome::{Connectome, DataPaths};
use crate::error::Result;
use crate::layout::SpringLayout;
use crate::style::Preferences;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub prefs_path: Option<PathBuf>,
    pub seed: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            prefs_path: None,
            seed: SpringLayout::default().seed,
        }
    }
}

impl AppConfig {
    /// Reads the process environment and arguments. Arguments this does not
    /// recognise are handed back in order.
    pub fn from_env_and_args() -> (Self, Vec<String>) {
        Self::from_sources(|k| env::var(k).ok(), env::args().skip(1))
    }

    pub fn from_sources<E, A>(env: E, args: A) -> (Self, Vec<String>)
    where
        E: Fn(&str) -> Option<String>,
        A: IntoIterator<Item = String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = env("CONNECTOME_DATA_DIR") {
            cfg.data_dir = PathBuf::from(v);
        }
        if let Some(v) = env("CONNECTOME_PREFS") {
            cfg.prefs_path = Some(PathBuf::from(v));
        }
        if let Some(v) = env("CONNECTOME_SEED") {
            cfg.set_seed(&v);
        }

        let mut rest = Vec::new();
        let mut args = args.into_iter();
        while let Some(a) = args.next() {
            match a.as_str() {
                "--data-dir" => {
                    if let Some(v) = args.next() {
                        cfg.data_dir = PathBuf::from(v);
                    }
                }
                "--prefs" => {
                    if let Some(v) = args.next() {
                        cfg.prefs_path = Some(PathBuf::from(v));
                    }
                }
                "--seed" => {
                    if let Some(v) = args.next() {
                        cfg.set_seed(&v);
                    }
                }
                _ => rest.push(a),
            }
        }
        (cfg, rest)
    }

    fn set_seed(&mut self, v: &str) {
        match v.trim().parse::<u64>() {
            Ok(n) => self.seed = n,
            Err(_) => warn!(value = v, "ignoring non-numeric seed"),
        }
    }

    pub fn data_paths(&self) -> DataPaths {
        DataPaths::in_dir(&self.data_dir)
    }

    pub fn load_connectome(&self) -> Result<Connectome> {
        Connectome::load(&self.data_paths())
    }

    /// Built-in defaults unless a preferences file is configured.
    pub fn load_preferences(&self) -> Result<Preferences> {
        match &self.prefs_path {
            #[cfg(feature = "serde")]
            Some(path) => {
                info!(path = %path.display(), "loading preferences");
                Preferences::load(path)
            }
            #[cfg(not(feature = "serde"))]
            Some(path) => {
                warn!(path = %path.display(), "built without serde; preferences file ignored");
                Ok(Preferences::default())
            }
            None => Ok(Preferences::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults() {
        let (cfg, rest) = AppConfig::from_sources(|_| None, Vec::new());
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
        assert!(rest.is_empty());
    }

    #[test]
    fn flags_override_env_and_leave_the_rest() {
        let env = |k: &str| match k {
            "CONNECTOME_DATA_DIR" => Some("/from/env".to_string()),
            "CONNECTOME_SEED" => Some("9".to_string()),
            _ => None,
        };
        let (cfg, rest) = AppConfig::from_sources(
            env,
            args(&["single", "--data-dir", "tables", "AVAL", "--seed", "3"]),
        );
        assert_eq!(cfg.data_dir, PathBuf::from("tables"));
        assert_eq!(cfg.seed, 3);
        assert_eq!(cfg.prefs_path, None);
        assert_eq!(rest, args(&["single", "AVAL"]));
    }

    #[test]
    fn bad_seed_keeps_previous_value() {
        let env = |k: &str| (k == "CONNECTOME_SEED").then(|| "11".to_string());
        let (cfg, _) = AppConfig::from_sources(env, args(&["--seed", "lots"]));
        assert_eq!(cfg.seed, 11);
    }

    #[test]
    fn preferences_default_without_a_file() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.load_preferences().unwrap(), Preferences::default());
    }

    #[test]
    fn missing_data_dir_is_an_io_error() {
        let cfg = AppConfig {
            data_dir: PathBuf::from("/definitely/not/here"),
            ..AppConfig::default()
        };
        assert!(matches!(
            cfg.load_connectome(),
            Err(crate::error::ConnectomeError::Io { .. })
        ));
    }
}
