//! Store configuration.
//!
//! Configuration is an explicit value handed to each reconciliation pass.
//! Only the binary reads the process environment (`StoreConfig::from_env`).

use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "api.bigcommerce.com";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing store configuration")]
    MissingStoreConfiguration,
}

/// Store identity and credential, possibly incomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub store_hash: Option<String>,
    pub access_token: Option<String>,
    /// Host (`api.bigcommerce.com`) or full base URL (`http://127.0.0.1:9000`).
    pub api_base: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_hash: None,
            access_token: None,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn new(store_hash: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            store_hash: Some(store_hash.into()),
            access_token: Some(access_token.into()),
            ..Self::default()
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Read `STORE_HASH`, `ACCESS_TOKEN` and `API_URL`. Blank values count as missing.
    pub fn from_env() -> Self {
        let read = |key: &str| {
            std::env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            store_hash: read("STORE_HASH"),
            access_token: read("ACCESS_TOKEN"),
            api_base: read("API_URL").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        }
    }

    /// Complete credentials, or an error if the store identity or token is missing.
    pub fn credentials(&self) -> Result<StoreCredentials, ConfigError> {
        let non_blank = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);

        match (non_blank(&self.store_hash), non_blank(&self.access_token)) {
            (Some(store_hash), Some(access_token)) => Ok(StoreCredentials {
                store_hash,
                access_token,
                api_base: self.api_base.clone(),
            }),
            _ => Err(ConfigError::MissingStoreConfiguration),
        }
    }
}

/// Credentials for one store, guaranteed complete.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreCredentials {
    pub store_hash: String,
    pub access_token: String,
    pub api_base: String,
}

impl StoreCredentials {
    /// Root of the store's REST API, e.g. `https://api.bigcommerce.com/stores/abc123`.
    pub fn store_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        if base.starts_with("http://") || base.starts_with("https://") {
            format!("{}/stores/{}", base, self.store_hash)
        } else {
            format!("https://{}/stores/{}", base, self.store_hash)
        }
    }
}

impl core::fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("store_hash", &self.store_hash)
            .field("access_token", &"<redacted>")
            .field("api_base", &self.api_base)
            .finish()
    }
}
