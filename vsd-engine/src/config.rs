//! Engine configuration
//!
//! Bootstrap configuration only: everything here is fixed for the lifetime
//! of the process. Runtime knobs (poll interval, cooldown, thresholds) are
//! per-request and live in the monitoring/job APIs instead.
//!
//! Layering priority: CLI argument > environment variable > TOML config
//! file > built-in default. CLI and environment are collapsed by clap
//! (`env = "..."` on each argument), so this module only sees the merged
//! override plus the file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use vsd_common::{config, Error, Result};

/// Default HTTP listen port
pub const DEFAULT_PORT: u16 = 5730;

/// Database filename under the data directory
pub const DB_FILENAME: &str = "vsd.db";

/// Optional TOML config file contents
///
/// Every field is optional; absent fields fall through to the next layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// HTTP server port
    pub port: Option<u16>,

    /// Data directory (database, evidence artifacts)
    pub data_dir: Option<PathBuf>,

    /// Remote classifier endpoint; absent means the built-in stub
    pub classifier_endpoint: Option<String>,

    /// Root directory for capture target spools
    pub capture_dir: Option<PathBuf>,
}

/// Merged CLI/environment overrides, as parsed in `main`
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub data_dir: Option<String>,
    pub config_file: Option<PathBuf>,
    pub classifier_endpoint: Option<String>,
    pub capture_dir: Option<PathBuf>,
}

/// Resolved engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// HTTP server port
    pub port: u16,

    /// Data directory root
    pub data_dir: PathBuf,

    /// SQLite database file path
    pub db_path: PathBuf,

    /// Evidence artifact root
    pub evidence_dir: PathBuf,

    /// Capture spool root (one subdirectory per target)
    pub capture_dir: PathBuf,

    /// Remote classifier endpoint; `None` selects the stub classifier
    pub classifier_endpoint: Option<String>,
}

impl EngineConfig {
    /// Resolve the full configuration from overrides plus the TOML file
    ///
    /// An explicitly named config file must exist and parse; the default
    /// platform location is optional and silently skipped when absent.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let file = load_toml(overrides.config_file.as_deref())?;
        Self::from_layers(overrides, file)
    }

    fn from_layers(overrides: ConfigOverrides, file: TomlConfig) -> Result<Self> {
        let port = overrides.port.or(file.port).unwrap_or(DEFAULT_PORT);

        let data_dir = if let Some(dir) = overrides.data_dir {
            PathBuf::from(dir)
        } else if let Some(dir) = file.data_dir {
            dir
        } else {
            config::resolve_data_dir(None, "VSD_DATA_DIR")?
        };

        let classifier_endpoint = overrides.classifier_endpoint.or(file.classifier_endpoint);

        let capture_dir = overrides
            .capture_dir
            .or(file.capture_dir)
            .unwrap_or_else(|| data_dir.join("spool"));

        Ok(EngineConfig {
            port,
            db_path: data_dir.join(DB_FILENAME),
            evidence_dir: data_dir.join("evidence"),
            capture_dir,
            data_dir,
            classifier_endpoint,
        })
    }
}

/// Load the TOML config file layer
///
/// `explicit` comes from `--config`; a missing or malformed explicit file is
/// an error. Without `--config` the platform default location is tried and
/// absence yields an empty layer.
fn load_toml(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match config::default_config_file() {
            Ok(path) => path,
            Err(_) => return Ok(TomlConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path).map_err(|e| {
        Error::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let parsed: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse config file {:?}: {}", path, e)))?;

    info!("Loaded configuration from {:?}", path);
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides_with_data_dir() -> ConfigOverrides {
        ConfigOverrides {
            data_dir: Some("/srv/vsd".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_port_applies() {
        let cfg = EngineConfig::from_layers(overrides_with_data_dir(), TomlConfig::default())
            .unwrap();
        assert_eq!(cfg.port, DEFAULT_PORT);
    }

    #[test]
    fn test_override_port_beats_file_port() {
        let mut overrides = overrides_with_data_dir();
        overrides.port = Some(9000);
        let file = TomlConfig {
            port: Some(8000),
            ..Default::default()
        };
        let cfg = EngineConfig::from_layers(overrides, file).unwrap();
        assert_eq!(cfg.port, 9000);
    }

    #[test]
    fn test_file_port_used_without_override() {
        let file = TomlConfig {
            port: Some(8000),
            ..Default::default()
        };
        let cfg = EngineConfig::from_layers(overrides_with_data_dir(), file).unwrap();
        assert_eq!(cfg.port, 8000);
    }

    #[test]
    fn test_derived_paths_live_under_data_dir() {
        let cfg = EngineConfig::from_layers(overrides_with_data_dir(), TomlConfig::default())
            .unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/vsd"));
        assert_eq!(cfg.db_path, PathBuf::from("/srv/vsd").join(DB_FILENAME));
        assert_eq!(cfg.evidence_dir, PathBuf::from("/srv/vsd/evidence"));
        assert_eq!(cfg.capture_dir, PathBuf::from("/srv/vsd/spool"));
    }

    #[test]
    fn test_capture_dir_override() {
        let mut overrides = overrides_with_data_dir();
        overrides.capture_dir = Some(PathBuf::from("/mnt/frames"));
        let cfg = EngineConfig::from_layers(overrides, TomlConfig::default()).unwrap();
        assert_eq!(cfg.capture_dir, PathBuf::from("/mnt/frames"));
    }

    #[test]
    fn test_classifier_endpoint_falls_back_to_file() {
        let file = TomlConfig {
            classifier_endpoint: Some("http://localhost:9001/infer".to_string()),
            ..Default::default()
        };
        let cfg = EngineConfig::from_layers(overrides_with_data_dir(), file).unwrap();
        assert_eq!(
            cfg.classifier_endpoint.as_deref(),
            Some("http://localhost:9001/infer")
        );
    }

    #[test]
    fn test_missing_explicit_config_file_is_error() {
        let missing = Path::new("/nonexistent/vsd-config.toml");
        let result = load_toml(Some(missing));
        assert!(result.is_err());
    }

    #[test]
    fn test_toml_layer_parses_all_fields() {
        let parsed: TomlConfig = toml::from_str(
            r#"
            port = 6001
            data_dir = "/var/lib/vsd"
            classifier_endpoint = "http://infer.local/api/detect"
            capture_dir = "/var/spool/vsd"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.port, Some(6001));
        assert_eq!(parsed.data_dir, Some(PathBuf::from("/var/lib/vsd")));
        assert_eq!(
            parsed.classifier_endpoint.as_deref(),
            Some("http://infer.local/api/detect")
        );
        assert_eq!(parsed.capture_dir, Some(PathBuf::from("/var/spool/vsd")));
    }

    #[test]
    fn test_empty_toml_is_empty_layer() {
        let parsed: TomlConfig = toml::from_str("").unwrap();
        assert!(parsed.port.is_none());
        assert!(parsed.data_dir.is_none());
        assert!(parsed.classifier_endpoint.is_none());
        assert!(parsed.capture_dir.is_none());
    }
}
