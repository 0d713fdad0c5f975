//! Backend construction parameters.

use std::fmt;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Parameters handed to a backend constructor.
///
/// Everything a backend needs is passed here explicitly; backends never read
/// the process environment on their own.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct BackendConfig {
    /// Endpoint URL, e.g. `https://my-bucket.cn-east-1-s3.qiniu.com`.
    #[cfg_attr(feature = "config", arg(long = "endpoint", env = "OBJGATE_ENDPOINT"))]
    pub endpoint: String,

    /// Access key.
    #[cfg_attr(feature = "config", arg(long = "access-key", env = "ACCESS_KEY"))]
    pub access_key: String,

    /// Secret key. Never serialized and masked in debug output.
    #[cfg_attr(
        feature = "config",
        arg(long = "secret-key", env = "SECRET_KEY", hide_env_values = true)
    )]
    #[serde(skip_serializing, default)]
    pub secret_key: String,

    /// Download domain for backends that read through signed URLs.
    #[cfg_attr(feature = "config", arg(long = "domain", env = "QINIU_DOMAIN"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl BackendConfig {
    /// Creates a configuration from an endpoint and a key pair.
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
        }
    }

    /// Sets the download domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Returns the download domain if one is set and non-empty.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref().filter(|d| !d.is_empty())
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .field("domain", &self.domain)
            .finish()
    }
}
