//! Piece-size constants (C1 input) plus a loadable user config: named
//! profiles of default CLI flags, read with `toml` + `directories`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Block size for V2 hashing (16 KiB)
pub const BLOCK_SIZE: usize = 16384;

/// Megabyte constant for piece length calculations
pub const MB: u64 = 1_048_576;

/// Piece length thresholds for automatic calculation
/// Maps total size to piece length power (2^N)
pub const PIECE_LENGTH_THRESHOLDS: [(u64, u32); 9] = [
    (50 * MB, 15),    // <=50MB   -> 2^15 (32 KB)
    (100 * MB, 16),   // <=100MB  -> 2^16 (64 KB)
    (200 * MB, 17),   // <=200MB  -> 2^17 (128 KB)
    (400 * MB, 18),   // <=400MB  -> 2^18 (256 KB)
    (800 * MB, 19),   // <=800MB  -> 2^19 (512 KB)
    (1600 * MB, 20),  // <=1.6GB  -> 2^20 (1 MB)
    (3200 * MB, 21),  // <=3.2GB  -> 2^21 (2 MB)
    (6400 * MB, 22),  // <=6.4GB  -> 2^22 (4 MB)
    (12800 * MB, 23), // <=12.8GB -> 2^23 (8 MB)
];

/// Named set of default `create` flags, selected with `--profile`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    pub announce: Option<Vec<String>>,
    pub comment: Option<String>,
    pub private: Option<bool>,
    pub piece_length: Option<u32>,
    pub threads: Option<usize>,
    pub web_seed: Option<Vec<String>>,
    pub cross_seed: Option<bool>,
    pub v2: Option<bool>,
    pub hybrid: Option<bool>,
    pub exclude: Option<Vec<String>>,
    #[serde(rename = "source")]
    pub source_string: Option<String>,
    pub no_date: Option<bool>,
}

/// User configuration: a map of named profiles, loaded from
/// `--config <path>` or the platform config directory
/// (`~/.config/torrite/config.toml` on Linux).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Config {
    /// Load from `path` if given, else the platform default location. A
    /// missing file (default location only) is not an error; it yields an
    /// empty config.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let resolved = match path {
            Some(p) => Some(p),
            None => default_config_path(),
        };

        let Some(path) = resolved else {
            return Ok(Config::default());
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                toml::from_str(&contents).with_context(|| format!("invalid config at {}", path.display()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(e).with_context(|| format!("failed to read config at {}", path.display())),
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "torrite").map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(dir.path().join("nope.toml"))).unwrap();
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn parses_profile_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [profiles.private]
            private = true
            announce = ["http://tracker/announce"]
            "#,
        )
        .unwrap();

        let config = Config::load(Some(path)).unwrap();
        let profile = config.profiles.get("private").unwrap();
        assert_eq!(profile.private, Some(true));
        assert_eq!(profile.announce.as_deref(), Some(&["http://tracker/announce".to_string()][..]));
    }
}
