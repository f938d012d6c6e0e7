use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::{Result, StreamError};

pub const TEMP_DIR_VAR: &str = "FS_STREAM_TMPDIR";
pub const CHUNK_SIZE_VAR: &str = "FS_STREAM_CHUNK_SIZE";

/// Largest slice handed to a handle by a single write call.
pub const DEFAULT_WRITE_CHUNK_SIZE: usize = 8192;

static GLOBAL: Lazy<Config> = Lazy::new(|| match Config::from_env() {
    Ok(config) => config,
    Err(e) => {
        log::warn!("ignoring stream configuration from environment: {}", e);
        Config::default()
    }
});

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory where handle-less streams keep their backing file.
    pub temp_dir: PathBuf,
    pub write_chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            temp_dir: env::temp_dir(),
            write_chunk_size: DEFAULT_WRITE_CHUNK_SIZE,
        }
    }
}

impl Config {
    /// Configuration shared by streams built without an explicit one.
    pub fn global() -> &'static Config {
        &GLOBAL
    }

    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(dir) = env::var_os(TEMP_DIR_VAR) {
            config.temp_dir = PathBuf::from(dir);
        }
        if let Ok(size) = env::var(CHUNK_SIZE_VAR) {
            config.write_chunk_size = size.trim().parse().map_err(|_| {
                StreamError::argument(format!(
                    "{} must be a positive integer, got `{}`",
                    CHUNK_SIZE_VAR, size
                ))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| {
            StreamError::io(
                format!("Unable to read configuration {}", path.display()),
                err,
            )
        })?;
        let config: Config = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.write_chunk_size == 0 {
            return Err(StreamError::argument(
                "write chunk size must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempdir::TempDir;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.write_chunk_size, 8192);
        assert_eq!(config.temp_dir, env::temp_dir());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_partial_json() {
        let dir = TempDir::new("stream_config").unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "write_chunk_size": 16 }"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.write_chunk_size, 16);
        assert_eq!(config.temp_dir, env::temp_dir());
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let dir = TempDir::new("stream_config").unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "write_chunk_size": 0 }"#).unwrap();

        assert!(Config::load(&path).unwrap_err().is_argument());
    }

    #[test]
    fn malformed_json_rejected() {
        let dir = TempDir::new("stream_config").unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        assert!(Config::load(&path).unwrap_err().is_argument());
        assert!(Config::load(dir.path().join("absent.json"))
            .unwrap_err()
            .is_runtime());
    }
}
