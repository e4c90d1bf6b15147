//! Configuration file location and data folder resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Data folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file (`data_dir` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_dir(cli_arg: Option<&str>, env_var_name: &str) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = default_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(data_dir) = config.get("data_dir").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(data_dir));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_data_dir())
}

/// Get the default configuration file path for the platform
pub fn default_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/vsd/config.toml first, then /etc/vsd/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("vsd").join("config.toml"));
        let system_config = PathBuf::from("/etc/vsd/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("vsd").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

/// Get OS-dependent default data folder path
fn default_data_dir() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/vsd (or /var/lib/vsd for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("vsd"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/vsd"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/vsd
        dirs::data_dir()
            .map(|d| d.join("vsd"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/vsd"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\vsd
        dirs::data_local_dir()
            .map(|d| d.join("vsd"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\vsd"))
    } else {
        PathBuf::from("./vsd_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_argument_wins() {
        let dir = resolve_data_dir(Some("/opt/vsd-data"), "VSD_TEST_UNSET_VAR").unwrap();
        assert_eq!(dir, PathBuf::from("/opt/vsd-data"));
    }

    #[test]
    fn test_env_var_beats_default() {
        // Unique variable name per test keeps these independent.
        std::env::set_var("VSD_DATA_DIR_TEST_A", "/srv/vsd");
        let dir = resolve_data_dir(None, "VSD_DATA_DIR_TEST_A").unwrap();
        assert_eq!(dir, PathBuf::from("/srv/vsd"));
        std::env::remove_var("VSD_DATA_DIR_TEST_A");
    }

    #[test]
    fn test_cli_beats_env() {
        std::env::set_var("VSD_DATA_DIR_TEST_B", "/srv/vsd");
        let dir = resolve_data_dir(Some("/opt/vsd-data"), "VSD_DATA_DIR_TEST_B").unwrap();
        assert_eq!(dir, PathBuf::from("/opt/vsd-data"));
        std::env::remove_var("VSD_DATA_DIR_TEST_B");
    }

    #[test]
    fn test_fallback_produces_some_path() {
        let dir = resolve_data_dir(None, "VSD_TEST_UNSET_VAR").unwrap();
        assert!(!dir.as_os_str().is_empty());
    }
}
