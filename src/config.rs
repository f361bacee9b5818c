//! Configuration management
//!
//! The dispatcher is configured through setters; this module adds an optional
//! TOML file on top of them. Every field has a default, so an empty or partial
//! file is valid.
//!
//! ```toml
//! [dispatcher]
//! level = "warning"
//! storage = ["console", "file"]
//! signal_inspection = false
//! listen_outside = false
//! attach_diagnostics = true
//! file_path = "logs/app.log"
//!
//! [network]
//! udp_port = 9002
//! ```

use crate::constants::DEFAULT_TRANSMIT_PORT;
use crate::error::{DispatchError, Result};
use crate::logging::{LogLevel, StorageModes};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

// =============================================================================
// Application Configuration
// =============================================================================

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dispatcher: DispatcherConfig,
    pub network: NetworkConfig,
}

/// Dispatcher settings, applied through its setters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Threshold
    pub level: LogLevel,
    /// Enabled destinations
    pub storage: StorageModes,
    /// Also subscribe to declared signals when instrumenting a tree
    pub signal_inspection: bool,
    /// Reserved
    pub listen_outside: bool,
    /// Install the diagnostic bridge at construction
    pub attach_diagnostics: bool,
    /// File sink path (append mode). None = no file sink.
    pub file_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Localhost UDP port the transmit forwarder sends to
    pub udp_port: u16,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Error,
            storage: StorageModes::CONSOLE,
            signal_inspection: false,
            listen_outside: false,
            attach_diagnostics: false,
            file_path: None,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            udp_port: DEFAULT_TRANSMIT_PORT,
        }
    }
}

/// Parse config text. `path` is only used for error reporting.
pub fn parse(content: &str, path: &Path) -> Result<Config> {
    toml::from_str(content).map_err(|e| DispatchError::ConfigParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Load config from `path`
pub fn load(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| DispatchError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse(&content, path)
}

/// Load config from `path`, falling back to defaults when missing or invalid
pub fn load_or_default(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    match load(path) {
        Ok(config) => config,
        Err(e) => {
            warn!("{}, using defaults", e);
            Config::default()
        }
    }
}

/// Save config to `path`
pub fn save(config: &Config, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).map_err(|e| DispatchError::ConfigParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    fs::write(path, content).map_err(|e| DispatchError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_temp_dir() -> PathBuf {
        let base = std::env::temp_dir();
        let pid = std::process::id();
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        base.join(format!("logdispatch-config-{}-{}", pid, ts))
    }

    // =========================================================================
    // Default values tests
    // =========================================================================

    #[test]
    fn test_default_dispatcher_config_values() {
        let config = DispatcherConfig::default();

        assert_eq!(config.level, LogLevel::Error);
        assert_eq!(config.storage, StorageModes::CONSOLE);
        assert!(!config.signal_inspection);
        assert!(!config.listen_outside);
        assert!(!config.attach_diagnostics);
        assert_eq!(config.file_path, None);
    }

    #[test]
    fn test_default_network_config_values() {
        assert_eq!(NetworkConfig::default().udp_port, DEFAULT_TRANSMIT_PORT);
    }

    // =========================================================================
    // Parsing tests
    // =========================================================================

    #[test]
    fn test_config_empty_file() {
        let config = parse("", Path::new("empty.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_partial_dispatcher_section() {
        let partial_toml = r#"
[dispatcher]
level = "info"
storage = ["console", "gui"]
"#;

        let config = parse(partial_toml, Path::new("partial.toml")).unwrap();

        assert_eq!(config.dispatcher.level, LogLevel::Info);
        assert_eq!(
            config.dispatcher.storage,
            StorageModes::CONSOLE | StorageModes::GUI
        );
        // Rest should be defaults
        assert!(!config.dispatcher.attach_diagnostics);
        assert_eq!(config.network.udp_port, DEFAULT_TRANSMIT_PORT);
    }

    #[test]
    fn test_config_rejects_unknown_level() {
        let bad = "[dispatcher]\nlevel = \"loud\"\n";
        match parse(bad, Path::new("bad.toml")) {
            Err(DispatchError::ConfigParse { path, .. }) => {
                assert_eq!(path, PathBuf::from("bad.toml"))
            }
            other => panic!("Expected ConfigParse, got {:?}", other),
        }
    }

    #[test]
    fn test_config_rejects_unknown_storage_mode() {
        let bad = "[dispatcher]\nstorage = [\"console\", \"tape\"]\n";
        assert!(parse(bad, Path::new("bad.toml")).is_err());
    }

    // =========================================================================
    // File tests
    // =========================================================================

    #[test]
    fn test_save_then_load() {
        let dir = unique_temp_dir();
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("logdispatch.toml");

        let config = Config {
            dispatcher: DispatcherConfig {
                level: LogLevel::Feature,
                storage: StorageModes::FILE | StorageModes::DATABASE,
                signal_inspection: true,
                listen_outside: false,
                attach_diagnostics: true,
                file_path: Some(PathBuf::from("logs/app.log")),
            },
            network: NetworkConfig { udp_port: 9105 },
        };

        save(&config, &path).unwrap();
        assert_eq!(load(&path).unwrap(), config);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_missing_file() {
        let path = unique_temp_dir().join("absent.toml");
        assert!(matches!(
            load(&path),
            Err(DispatchError::ConfigRead { .. })
        ));
        assert_eq!(load_or_default(&path), Config::default());
    }

    #[test]
    fn test_load_or_default_on_invalid_file() {
        let dir = unique_temp_dir();
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.toml");
        fs::write(&path, "[dispatcher\nlevel = ").unwrap();

        assert_eq!(load_or_default(&path), Config::default());

        let _ = fs::remove_dir_all(&dir);
    }
}
