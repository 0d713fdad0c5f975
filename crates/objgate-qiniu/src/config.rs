//! Qiniu backend configuration.

use std::fmt;
use std::time::Duration;

use objgate_core::BackendConfig;
use serde::{Deserialize, Serialize};

use crate::auth::DEFAULT_TOKEN_TTL;

/// Qiniu backend configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QiniuConfig {
    /// Endpoint URL: `https://<bucket>.<region>-<provider domain>`.
    pub endpoint: String,
    /// Access key.
    pub access_key: String,
    /// Secret key.
    #[serde(skip_serializing, default)]
    pub secret_key: String,
    /// Download domain bound to the bucket. Only needed to read keys that
    /// start with `/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Lifetime of signed download URLs.
    #[serde(default = "default_download_expiry")]
    pub download_expiry: Duration,
}

fn default_download_expiry() -> Duration {
    DEFAULT_TOKEN_TTL
}

impl QiniuConfig {
    /// Creates a configuration without a download domain.
    pub fn new(
        endpoint: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            domain: None,
            download_expiry: DEFAULT_TOKEN_TTL,
        }
    }

    /// Sets the download domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Builds a configuration from generic backend parameters.
    pub fn from_backend_config(config: &BackendConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            access_key: config.access_key.clone(),
            secret_key: config.secret_key.clone(),
            domain: config.domain().map(str::to_string),
            download_expiry: DEFAULT_TOKEN_TTL,
        }
    }
}

impl fmt::Debug for QiniuConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QiniuConfig")
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .field("domain", &self.domain)
            .field("download_expiry", &self.download_expiry)
            .finish()
    }
}
