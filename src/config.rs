use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{OdbqlError, Result};

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub connection: ConnectionConfig,
}

/// Connection parameters for a SQL Server instance.
///
/// The password is kept as plain text, matching what the driver connection
/// string carries; keep the file's permissions accordingly.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    pub server: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
}

/// Loads configuration from a TOML file at the given path.
///
/// # Arguments
///
/// * `path` - The file path to the TOML configuration file.
///
/// # Errors
///
/// Returns `OdbqlError::Io` when the file cannot be read and
/// `OdbqlError::Config` when it is not valid TOML or misses required
/// fields.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| OdbqlError::Config(e.to_string()))
}

/// Default location of the configuration file, under the platform
/// configuration directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("odbql").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_CONFIG: &str = r#"
[connection]
server = "db.example.com"
port = 1433
database = "inventory"
username = "reader"
password = "hunter2"
"#;

    #[test]
    fn test_load_config_from_str() {
        let config: Config = toml::from_str(SAMPLE_CONFIG).expect("Failed to parse sample config");
        assert_eq!(config.connection.server, "db.example.com");
        assert_eq!(config.connection.port, 1433);
        assert_eq!(config.connection.database, "inventory");
        assert_eq!(config.connection.username, "reader");
        assert_eq!(config.connection.password, "hunter2");
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(SAMPLE_CONFIG.as_bytes())
            .expect("Failed to write sample config");

        let config = load_config(file.path()).expect("Failed to load config file");
        assert_eq!(config.connection.server, "db.example.com");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        match load_config("/nonexistent/odbql/config.toml") {
            Err(OdbqlError::Io(_)) => {}
            other => panic!("Expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(b"[connection\nserver = ")
            .expect("Failed to write bad config");

        match load_config(file.path()) {
            Err(OdbqlError::Config(_)) => {}
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_field_is_config_error() {
        let incomplete = "[connection]\nserver = \"localhost\"\n";
        let parsed: std::result::Result<Config, _> = toml::from_str(incomplete);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_default_config_path_ends_with_crate_dir() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("odbql/config.toml"));
        }
    }
}
