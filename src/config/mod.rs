mod schema;

pub use schema::{Config, DisplayConfig};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/podium/)
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("podium"))
}

/// Get the default config file path (~/.config/podium/config.yaml)
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.yaml"))
}

/// Load configuration from a YAML file
///
/// An explicit `path` must exist. Without one the default location is tried,
/// and a missing default file yields the built-in defaults.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found at {}", path.display());
            }
            path
        }
        None => match get_config_path() {
            Some(default) if default.exists() => default,
            _ => {
                log::debug!("no user config found, using defaults");
                return Ok(Config::default());
            }
        },
    };

    parse_config_file(&config_path)
}

fn parse_config_file(config_path: &Path) -> Result<Config> {
    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{DistanceUnit, WeightUnit};
    use crate::scoring::{Algorithm, DnfPolicy};
    use tempfile::TempDir;

    #[test]
    fn test_load_full_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            r#"
scoring:
  algorithm: winner_takes_more
  statusHandling:
    dnf: last_place
display:
  weight_unit: kg
  distance_unit: km
  compact: true
"#,
        )
        .unwrap();

        let config = load_config(Some(path)).unwrap();
        let scoring = config.scoring.unwrap();
        assert_eq!(scoring.algorithm, Algorithm::WinnerTakesMore);
        assert_eq!(scoring.status_handling.dnf, DnfPolicy::LastPlace);
        assert_eq!(config.display.weight_unit, WeightUnit::Kg);
        assert_eq!(config.display.distance_unit, Some(DistanceUnit::Kilometers));
        assert!(config.display.compact);
    }

    #[test]
    fn test_empty_display_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "scoring: null\n").unwrap();

        let config = load_config(Some(path)).unwrap();
        assert!(config.scoring.is_none());
        assert_eq!(config.display, DisplayConfig::default());
        assert_eq!(config.display.units().weight_unit, WeightUnit::Lbs);
    }

    #[test]
    fn test_missing_explicit_path_errors() {
        let dir = TempDir::new().unwrap();
        let err = load_config(Some(dir.path().join("missing.yaml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_invalid_yaml_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "display:\n  weight_unit: stone\n").unwrap();
        assert!(load_config(Some(path)).is_err());
    }
}
