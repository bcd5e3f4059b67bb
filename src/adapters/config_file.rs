//! JSON file configuration adapter.
//!
//! Implements [`ConfigPort`] over a JSON document on disk. Fields missing
//! from the file fall back to [`TwinConfig::default`]; the merged result is
//! validated before it is returned.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::ConfigPort;
use crate::config::TwinConfig;
use crate::error::ConfigError;

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<TwinConfig, ConfigError> {
        let text = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::IoError,
        })?;

        let config: TwinConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("Config: {} is not valid JSON: {}", self.path.display(), e);
            ConfigError::Corrupted
        })?;
        config.validate()?;

        info!("Config: loaded {}", self.path.display());
        Ok(config)
    }
}

/// Load from `port`, falling back to defaults only when nothing is stored.
///
/// Corrupted or invalid files are still an error.
pub fn load_or_default(port: &impl ConfigPort) -> Result<TwinConfig, ConfigError> {
    match port.load() {
        Err(ConfigError::NotFound) => {
            info!("Config: none stored, using defaults");
            Ok(TwinConfig::default())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "greentwin-{}-{}.json",
            name,
            std::process::id()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_file_is_not_found() {
        let port = JsonConfigFile::new("/nonexistent/greentwin/config.json");
        assert_eq!(port.load(), Err(ConfigError::NotFound));
        assert_eq!(load_or_default(&port), Ok(TwinConfig::default()));
    }

    #[test]
    fn partial_file_merges_with_defaults() {
        let path = temp_file("partial", r#"{"move_speed": 0.8, "plant_capacity": 40}"#);
        let config = JsonConfigFile::new(&path).load().unwrap();
        fs::remove_file(&path).ok();

        assert!((config.move_speed - 0.8).abs() < f32::EPSILON);
        assert_eq!(config.plant_capacity, 40);
        assert_eq!(config.seedling_age_days, TwinConfig::default().seedling_age_days);
    }

    #[test]
    fn garbage_is_corrupted() {
        let path = temp_file("garbage", "{ not json");
        let result = JsonConfigFile::new(&path).load();
        fs::remove_file(&path).ok();
        assert_eq!(result, Err(ConfigError::Corrupted));
    }

    #[test]
    fn out_of_range_values_fail_validation() {
        let path = temp_file("invalid", r#"{"seedling_age_days": 80}"#);
        let result = JsonConfigFile::new(&path).load();
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ConfigError::ValidationFailed(_))));
    }
}
