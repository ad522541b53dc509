use crate::core::counter_client::TlsSettings;
use crate::core::validation;
use crate::error::{CheckError, Result as CheckResult};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 9000;
pub const DEFAULT_UNIT: &str = "%";
pub const DEFAULT_TIMEOUT: &str = "10s";

/// Defaults read from the optional JSON config file.
///
/// Every field is optional; anything given on the command line or through
/// the environment wins over the file.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub unit: Option<String>,
    pub cacert: Option<PathBuf>,
    pub certificate: Option<PathBuf>,
    pub key: Option<PathBuf>,
    pub timeout: Option<String>,
    pub insecure: Option<bool>,
}

impl FileConfig {
    /// Load the config file.
    ///
    /// An explicit path must exist. Without one the per-user default
    /// location is tried and silently skipped when absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(FileConfig::default()),
            },
        };

        log::debug!("Loading config file {:?}", path);

        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if data.trim().is_empty() {
            return Ok(FileConfig::default());
        }

        serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("agent-check").join("config.json"))
    }
}

/// Values supplied on the command line (clap already folds in the
/// environment variables for the fields that have one).
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub counter: Option<String>,
    pub warning: Option<String>,
    pub critical: Option<String>,
    pub unit: Option<String>,
    pub cacert: Option<PathBuf>,
    pub certificate: Option<PathBuf>,
    pub key: Option<PathBuf>,
    pub timeout: Option<String>,
    pub insecure: bool,
}

/// Fully resolved settings for one check invocation
#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub counter: String,
    pub warning: Option<String>,
    pub critical: Option<String>,
    pub unit: String,
    pub tls: TlsSettings,
    pub timeout: Duration,
}

impl CheckConfig {
    /// Merge command line values over the config file and validate the result
    pub fn resolve(file: FileConfig, cli: ConfigOverrides) -> CheckResult<Self> {
        let host = cli.host.or(file.host).unwrap_or_default();
        validation::validate_host(&host)?;

        let password = cli.password.or(file.password).unwrap_or_default();
        if password.is_empty() {
            return Err(CheckError::config("password is not set"));
        }

        let timeout_text = cli
            .timeout
            .or(file.timeout)
            .unwrap_or_else(|| DEFAULT_TIMEOUT.to_string());
        let timeout = validation::parse_timeout(&timeout_text)?;

        let certificate = cli.certificate.or(file.certificate);
        let key = cli.key.or(file.key);
        validation::validate_client_identity(certificate.as_deref(), key.as_deref())?;

        Ok(CheckConfig {
            host,
            port: cli.port.or(file.port).unwrap_or(DEFAULT_PORT),
            username: cli.username.or(file.username).unwrap_or_default(),
            password,
            counter: cli.counter.unwrap_or_default(),
            warning: cli.warning.filter(|w| !w.is_empty()),
            critical: cli.critical.filter(|c| !c.is_empty()),
            unit: cli
                .unit
                .or(file.unit)
                .unwrap_or_else(|| DEFAULT_UNIT.to_string()),
            tls: TlsSettings {
                ca_certificate: cli.cacert.or(file.cacert),
                client_certificate: certificate,
                client_key: key,
                insecure: cli.insecure || file.insecure.unwrap_or(false),
            },
            timeout,
        })
    }
}
