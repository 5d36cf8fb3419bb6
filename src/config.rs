//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before any listener
//! is bound.
//!
//! ## Variables
//!
//! - `LISTEN` - Query service bind address (default: `0.0.0.0:8080`)
//! - `INGEST_LISTEN` - Ingestion gateway bind address (default: `127.0.0.1:6565`)
//! - `RECORDS_PATH` - Record collection file (default: `data/connections.json`)
//! - `REPORT_PATH` - Last built report file (default: `data/report.json`)
//! - `INGEST_READ_TIMEOUT_SECS` - Per-connection gateway read timeout (default: 5, max: 300)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//!
//! ```bash
//! export LISTEN="0.0.0.0:8080"
//! export INGEST_LISTEN="127.0.0.1:6565"
//! export RECORDS_PATH="/var/lib/link-analytics/connections.json"
//! ```

use anyhow::Result;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub ingest_listen_addr: String,
    /// File holding every parent and click record.
    pub records_path: PathBuf,
    /// File holding the most recently built report; overwritten per build.
    pub report_path: PathBuf,
    pub ingest_read_timeout_secs: u64,
    pub log_level: String,
    pub log_format: String,
}

impl Config {
    /// Loads configuration from environment variables, applying defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let ingest_listen_addr =
            env::var("INGEST_LISTEN").unwrap_or_else(|_| "127.0.0.1:6565".to_string());

        let records_path = env::var("RECORDS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/connections.json"));
        let report_path = env::var("REPORT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/report.json"));

        let ingest_read_timeout_secs = match env::var("INGEST_READ_TIMEOUT_SECS") {
            Ok(v) => v.parse().map_err(|_| {
                anyhow::anyhow!("INGEST_READ_TIMEOUT_SECS must be a number, got '{}'", v)
            })?,
            Err(_) => 5,
        };

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        Ok(Self {
            listen_addr,
            ingest_listen_addr,
            records_path,
            report_path,
            ingest_read_timeout_secs,
            log_level,
            log_format,
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - either bind address is not a valid `host:port` socket address
    /// - both services are configured on the same address
    /// - the records and report files are the same path
    /// - `ingest_read_timeout_secs` is outside `1..=300`
    /// - `log_format` is not `text` or `json`
    pub fn validate(&self) -> Result<()> {
        if self.listen_addr.parse::<SocketAddr>().is_err() {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if self.ingest_listen_addr.parse::<SocketAddr>().is_err() {
            anyhow::bail!(
                "INGEST_LISTEN must be in format 'host:port', got '{}'",
                self.ingest_listen_addr
            );
        }

        if self.listen_addr == self.ingest_listen_addr {
            anyhow::bail!(
                "LISTEN and INGEST_LISTEN must differ, both are '{}'",
                self.listen_addr
            );
        }

        if self.records_path.as_os_str().is_empty() || self.report_path.as_os_str().is_empty() {
            anyhow::bail!("RECORDS_PATH and REPORT_PATH must not be empty");
        }

        if self.records_path == self.report_path {
            anyhow::bail!(
                "RECORDS_PATH and REPORT_PATH must differ, both are '{}'",
                self.records_path.display()
            );
        }

        if self.ingest_read_timeout_secs == 0 || self.ingest_read_timeout_secs > 300 {
            anyhow::bail!(
                "INGEST_READ_TIMEOUT_SECS must be between 1 and 300, got {}",
                self.ingest_read_timeout_secs
            );
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        Ok(())
    }

    pub fn ingest_read_timeout(&self) -> Duration {
        Duration::from_secs(self.ingest_read_timeout_secs)
    }

    /// Prints configuration summary.
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Query listen address: {}", self.listen_addr);
        tracing::info!("  Ingest listen address: {}", self.ingest_listen_addr);
        tracing::info!("  Records file: {}", self.records_path.display());
        tracing::info!("  Report file: {}", self.report_path.display());
        tracing::info!("  Ingest read timeout: {}s", self.ingest_read_timeout_secs);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if a variable is malformed or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "LISTEN",
        "INGEST_LISTEN",
        "RECORDS_PATH",
        "REPORT_PATH",
        "INGEST_READ_TIMEOUT_SECS",
        "RUST_LOG",
        "LOG_FORMAT",
    ];

    fn clear_env() {
        for var in VARS {
            // SAFETY: Tests touching the environment run serially via #[serial]
            unsafe { env::remove_var(var) };
        }
    }

    fn valid_config() -> Config {
        Config {
            listen_addr: "0.0.0.0:8080".to_string(),
            ingest_listen_addr: "127.0.0.1:6565".to_string(),
            records_path: PathBuf::from("data/connections.json"),
            report_path: PathBuf::from("data/report.json"),
            ingest_read_timeout_secs: 5,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }

    #[test]
    fn test_config_validation() {
        let mut config = valid_config();
        assert!(config.validate().is_ok());

        config.listen_addr = "8080".to_string();
        assert!(config.validate().is_err());
        config.listen_addr = "0.0.0.0:8080".to_string();

        config.ingest_listen_addr = "0.0.0.0:8080".to_string();
        assert!(config.validate().is_err());
        config.ingest_listen_addr = "127.0.0.1:6565".to_string();

        config.report_path = config.records_path.clone();
        assert!(config.validate().is_err());
        config.report_path = PathBuf::from("data/report.json");

        config.ingest_read_timeout_secs = 0;
        assert!(config.validate().is_err());
        config.ingest_read_timeout_secs = 301;
        assert!(config.validate().is_err());
        config.ingest_read_timeout_secs = 5;

        config.log_format = "xml".to_string();
        assert!(config.validate().is_err());
        config.log_format = "json".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();

        let config = load_from_env().unwrap();

        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.ingest_listen_addr, "127.0.0.1:6565");
        assert_eq!(config.records_path, PathBuf::from("data/connections.json"));
        assert_eq!(config.report_path, PathBuf::from("data/report.json"));
        assert_eq!(config.ingest_read_timeout(), Duration::from_secs(5));
    }

    #[test]
    #[serial]
    fn test_overrides_from_env() {
        clear_env();
        // SAFETY: Tests are run serially due to #[serial], so no concurrent access
        unsafe {
            env::set_var("INGEST_LISTEN", "0.0.0.0:7000");
            env::set_var("RECORDS_PATH", "/tmp/records.json");
            env::set_var("INGEST_READ_TIMEOUT_SECS", "30");
        }

        let config = load_from_env().unwrap();

        assert_eq!(config.ingest_listen_addr, "0.0.0.0:7000");
        assert_eq!(config.records_path, PathBuf::from("/tmp/records.json"));
        assert_eq!(config.ingest_read_timeout_secs, 30);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_non_numeric_timeout_is_rejected() {
        clear_env();
        // SAFETY: Tests are run serially
        unsafe { env::set_var("INGEST_READ_TIMEOUT_SECS", "soon") };

        assert!(Config::from_env().is_err());

        clear_env();
    }
}
