//! Run configuration: target database identity plus run-mode flags.
//!
//! Resolution happens exactly once at startup (defaults, then the JSON
//! config file, then environment overrides) and the result is passed by
//! reference afterwards - no process-wide mutable state.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::ui;

pub const DEFAULT_CONFIG_PATH: &str = "db_config.json";

/// The database, service account and endpoint this run provisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub name: String,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: "universal_db".to_string(),
            user: "webadmin".to_string(),
            password: "Password123!".to_string(),
            host: "localhost".to_string(),
            port: 3306,
        }
    }
}

/// Run-mode flags from the command line. Immutable for the whole run.
#[derive(Debug, Clone)]
pub struct SetupOptions {
    pub sample_data: bool,
    pub test_only: bool,
    pub verbose: bool,
    pub config_path: PathBuf,
}

/// Partial overlay read from the JSON config file; absent keys keep the
/// previous value.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    name: Option<String>,
    user: Option<String>,
    password: Option<String>,
    host: Option<String>,
    port: Option<u16>,
}

impl DatabaseConfig {
    /// Resolve the effective configuration: built-in defaults, overridden
    /// by the config file (if present and well-formed), overridden by
    /// `DB_*` environment variables.
    pub fn resolve(config_path: &Path) -> Self {
        let mut config = Self::default();
        config.apply_file(config_path);
        config.apply_env();
        config
    }

    fn apply_file(&mut self, path: &Path) {
        if !path.exists() {
            return;
        }
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                ui::warning(&format!(
                    "could not read config file {}: {} (using defaults)",
                    path.display(),
                    err
                ));
                return;
            }
        };
        match serde_json::from_str::<FileConfig>(&contents) {
            Ok(file) => self.merge(file),
            Err(err) => ui::warning(&format!(
                "ignoring malformed config file {}: {}",
                path.display(),
                err
            )),
        }
    }

    fn merge(&mut self, file: FileConfig) {
        if let Some(name) = file.name {
            self.name = name;
        }
        if let Some(user) = file.user {
            self.user = user;
        }
        if let Some(password) = file.password {
            self.password = password;
        }
        if let Some(host) = file.host {
            self.host = host;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
    }

    fn apply_env(&mut self) {
        if let Ok(name) = env::var("DB_NAME") {
            self.name = name;
        }
        if let Ok(user) = env::var("DB_USER") {
            self.user = user;
        }
        if let Ok(password) = env::var("DB_PASSWORD") {
            self.password = password;
        }
        if let Ok(host) = env::var("DB_HOST") {
            self.host = host;
        }
        if let Ok(port) = env::var("DB_PORT") {
            match port.parse::<u16>() {
                Ok(port) => self.port = port,
                Err(_) => ui::warning(&format!(
                    "ignoring DB_PORT='{}': not a valid port number",
                    port
                )),
            }
        }
    }

    /// Endpoint string for status output.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const ENV_KEYS: [&str; 5] = ["DB_NAME", "DB_USER", "DB_PASSWORD", "DB_HOST", "DB_PORT"];

    fn clear_env() {
        for key in ENV_KEYS {
            unsafe { env::remove_var(key) };
        }
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    #[serial]
    fn test_defaults_when_no_file_and_no_env() {
        clear_env();
        let config = DatabaseConfig::resolve(Path::new("/nonexistent/db_config.json"));
        assert_eq!(config, DatabaseConfig::default());
        assert_eq!(config.name, "universal_db");
        assert_eq!(config.port, 3306);
    }

    #[test]
    #[serial]
    fn test_file_overrides_defaults() {
        clear_env();
        let file = write_config(r#"{"name": "shop_db", "port": 3307}"#);
        let config = DatabaseConfig::resolve(file.path());
        assert_eq!(config.name, "shop_db");
        assert_eq!(config.port, 3307);
        // Untouched fields keep their defaults
        assert_eq!(config.user, "webadmin");
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        clear_env();
        let file = write_config(r#"{"name": "shop_db", "host": "db.internal"}"#);
        unsafe {
            env::set_var("DB_NAME", "env_db");
            env::set_var("DB_PORT", "3310");
        }
        let config = DatabaseConfig::resolve(file.path());
        assert_eq!(config.name, "env_db");
        assert_eq!(config.port, 3310);
        // File value survives where no env override exists
        assert_eq!(config.host, "db.internal");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_malformed_file_keeps_defaults() {
        clear_env();
        let file = write_config("{not json");
        let config = DatabaseConfig::resolve(file.path());
        assert_eq!(config, DatabaseConfig::default());
    }

    #[test]
    #[serial]
    fn test_invalid_port_env_keeps_previous_value() {
        clear_env();
        unsafe { env::set_var("DB_PORT", "not-a-port") };
        let config = DatabaseConfig::resolve(Path::new("/nonexistent/db_config.json"));
        assert_eq!(config.port, 3306);
        clear_env();
    }
}
