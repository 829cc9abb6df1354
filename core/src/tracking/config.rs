//! Configuration loading for tracking objectives
//!
//! Configuration lives in a single TOML file, by default in the user's
//! config directory. Files are validated after parsing so the engine only
//! ever sees a well-formed snapshot.

use std::fs;
use std::path::{Path, PathBuf};

use markers_types::TrackingConfig;
use thiserror::Error;

/// File name looked up in the config directory
pub const CONFIG_FILE_NAME: &str = "SmartMarkers.toml";

/// Load and validate a config file
pub fn load_file(path: &Path) -> Result<TrackingConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = from_toml_str(&contents, &path.display().to_string())?;
    tracing::info!(
        path = %path.display(),
        journal_entries = config.journal_entries.len(),
        objectives = config.objectives().count(),
        "Loaded tracking configuration"
    );
    Ok(config)
}

/// Parse and validate config text. `origin` names the source in errors.
pub fn from_toml_str(contents: &str, origin: &str) -> Result<TrackingConfig, ConfigError> {
    let config: TrackingConfig = toml::from_str(contents).map_err(|e| ConfigError::Parse {
        origin: origin.to_string(),
        source: e,
    })?;

    config.validate().map_err(|reason| ConfigError::Invalid {
        origin: origin.to_string(),
        reason,
    })?;

    if config.general.search_radius <= 0.0 {
        tracing::warn!(origin, "search_radius <= 0, scanning will stay disabled");
    }

    Ok(config)
}

/// Load the config at `path`, falling back to the default location.
///
/// A missing default file yields the built-in defaults (no objectives).
pub fn load_or_default(path: Option<&Path>) -> Result<TrackingConfig, ConfigError> {
    if let Some(path) = path {
        return load_file(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => load_file(&path),
        _ => {
            tracing::info!("No configuration file found, using defaults");
            Ok(TrackingConfig::default())
        }
    }
}

/// Get the default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("smart-markers").join(CONFIG_FILE_NAME))
}

/// Errors that can occur during config loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {origin}: {source}")]
    Parse {
        origin: String,
        source: toml::de::Error,
    },

    #[error("Invalid configuration in {origin}: {reason}")]
    Invalid { origin: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_objectives_toml() {
        let toml = r#"
[general]
search_radius = 1500.0

[journal.loot]
name = "Loot"
reference_aliases_per_objective = 4

[[journal.loot.objective]]
name = "Containers"
form_types = ["container"]
non_empty_inventory = true
"#;

        let config = from_toml_str(toml, "inline").unwrap();
        assert_eq!(config.general.search_radius, 1500.0);
        assert_eq!(config.objectives().count(), 1);
    }

    #[test]
    fn test_parse_error_names_origin() {
        let err = from_toml_str("[general\nsearch_radius = 1", "broken.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let toml = r#"
[[journal.loot.objective]]
name = ""
"#;
        let err = from_toml_str(toml, "inline").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }), "{err}");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_file(Path::new("/definitely/not/here/SmartMarkers.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_disabled_radius_still_loads() {
        let config = from_toml_str("[general]\nsearch_radius = 0.0\n", "inline").unwrap();
        assert_eq!(config.general.search_radius, 0.0);
    }
}
