// Credentials and runtime settings.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::DEFAULT_BASE_URL;
use crate::error::ConfigError;
use crate::token::{TokenSigner, DEFAULT_TTL_SECS};

/// Default config file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "appstore.toml";

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// API credentials.
    pub credentials: Credentials,
    /// Where downloaded reports go.
    #[serde(default)]
    pub download: DownloadConfig,
    /// Reporting API settings.
    #[serde(default)]
    pub api: ApiConfig,
}

/// API key material and vendor account.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    /// Key ID shown next to the private key.
    pub key_id: String,
    /// Issuer ID of the API key.
    pub issuer_id: String,
    /// Vendor number the reports belong to.
    pub vendor_number: String,
    /// PEM text of the `.p8` key.
    #[serde(default)]
    pub private_key: Option<String>,
    /// Path to the `.p8` key file; used when `private_key` is unset.
    #[serde(default)]
    pub private_key_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadConfig {
    #[serde(default = "default_download_dir")]
    pub dir: PathBuf,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            dir: default_download_dir(),
        }
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("applestore_dl")
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_token_ttl_secs() -> i64 {
    DEFAULT_TTL_SECS
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Credentials {
    /// Builds a token signer from whichever key source is configured.
    pub fn signer(&self, ttl_secs: i64) -> Result<TokenSigner, ConfigError> {
        let signer = match (&self.private_key, &self.private_key_path) {
            (Some(pem), _) => TokenSigner::from_pem(&self.key_id, &self.issuer_id, pem.as_bytes())?,
            (None, Some(path)) => TokenSigner::from_file(&self.key_id, &self.issuer_id, path)?,
            (None, None) => return Err(ConfigError::MissingPrivateKey),
        };
        Ok(signer.with_ttl(ttl_secs))
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file and `APPSTORE__*` environment
    /// variables, the latter taking precedence.
    ///
    /// An explicitly given file must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (file, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let config = config::Config::builder()
            .add_source(config::File::from(file).required(required))
            .add_source(config::Environment::with_prefix("APPSTORE").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
