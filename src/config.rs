use config::{Config, Environment, File};
use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Loads configuration from an optional config file and environment variables.
///
/// Sources, lowest precedence first: built-in defaults, the config file,
/// `WITHDRAWALS__*` environment variables, and finally the legacy
/// `WITHDRAWALS_FILE` variable for the ledger path.
pub fn load_config(config_file_path: Option<&Path>) -> anyhow::Result<AppConfig> {
    // Load .env file if it exists, ignore if not present
    dotenv().ok();

    let mut settings = Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000)?
        .set_default("server.base_path", "/api/withdrawals")?
        .set_default("storage.backend", "file")?
        .set_default("storage.file_path", "withdrawals.json")?
        .set_default("storage.max_connections", 5)?
        .set_default("logging.level", "info")?
        .set_default("logging.json", false)?;

    if let Some(path) = config_file_path {
        settings = settings.add_source(File::from(path).required(true));
    }

    // Add environment variables with prefix WITHDRAWALS
    settings = settings.add_source(Environment::with_prefix("WITHDRAWALS").separator("__"));

    if let Ok(file_path) = std::env::var("WITHDRAWALS_FILE") {
        settings = settings.set_override("storage.file_path", file_path)?;
    }

    let app_config = settings.build()?.try_deserialize::<AppConfig>()?;

    Ok(app_config)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Prefix under which the withdrawal endpoints are mounted.
    pub base_path: String,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
    Postgres,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub file_path: PathBuf,
    pub max_connections: u32,
}

impl StorageConfig {
    pub fn get_db_url(&self) -> anyhow::Result<String> {
        std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL is not set in environment or .env file"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String, // "debug" | "info" | "warn" | "error"
    pub file: Option<PathBuf>,
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
host = "127.0.0.1"
port = 8081
base_path = "/v1/withdrawals"

[storage]
backend = "memory"
file_path = "ledger.json"
max_connections = 2

[logging]
level = "debug"
file = "logs/access.log"
json = true
"#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.server.bind_address(), "127.0.0.1:8081");
        assert_eq!(config.server.base_path, "/v1/withdrawals");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.max_connections, 2);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, Some(PathBuf::from("logs/access.log")));
        assert!(config.logging.json);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let result = load_config(Some(Path::new("/nonexistent/withdrawals.toml")));
        assert!(result.is_err());
    }
}
