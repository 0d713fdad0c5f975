//! S3-compatible backend configuration.

use std::fmt;

use objgate_core::{BackendConfig, StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use url::Url;

/// Region used when none can be derived from the endpoint.
pub const DEFAULT_REGION: &str = "us-east-1";

/// S3-compatible backend configuration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Config {
    /// Bucket name.
    pub bucket: String,
    /// Region identifier.
    pub region: String,
    /// Custom endpoint URL (for S3-compatible storage such as Qiniu or MinIO).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Access key ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    /// Secret access key.
    #[serde(skip_serializing)]
    pub secret_access_key: Option<String>,
    /// Address buckets as `bucket.endpoint` instead of `endpoint/bucket`.
    #[serde(default)]
    pub virtual_host_style: bool,
}

impl S3Config {
    /// Creates a new S3 configuration.
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            virtual_host_style: false,
        }
    }

    /// Sets the custom endpoint (for S3-compatible storage).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the access credentials.
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Switches between virtual-host and path-style addressing.
    pub fn with_virtual_host_style(mut self, enabled: bool) -> Self {
        self.virtual_host_style = enabled;
        self
    }

    /// Derives a configuration from a `<scheme>://<bucket>.<service host>`
    /// endpoint.
    pub fn from_backend_config(config: &BackendConfig) -> StorageResult<Self> {
        let url = Url::parse(&config.endpoint)
            .map_err(|e| StorageError::invalid_endpoint(&config.endpoint, e.to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| StorageError::invalid_endpoint(&config.endpoint, "missing host"))?;
        let (bucket, service) = host
            .split_once('.')
            .filter(|(bucket, service)| !bucket.is_empty() && !service.is_empty())
            .ok_or_else(|| {
                StorageError::invalid_endpoint(&config.endpoint, "expected <bucket>.<host>")
            })?;

        let endpoint = match url.port() {
            Some(port) => format!("{}://{service}:{port}", url.scheme()),
            None => format!("{}://{service}", url.scheme()),
        };

        Ok(Self::new(bucket, DEFAULT_REGION)
            .with_endpoint(endpoint)
            .with_credentials(&config.access_key, &config.secret_key))
    }
}

impl fmt::Debug for S3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Config")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("virtual_host_style", &self.virtual_host_style)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_backend_config_splits_bucket() {
        let backend = BackendConfig::new("https://photos.s3.example.com", "ak", "sk");
        let config = S3Config::from_backend_config(&backend).unwrap();

        assert_eq!(config.bucket, "photos");
        assert_eq!(config.region, DEFAULT_REGION);
        assert_eq!(config.endpoint.as_deref(), Some("https://s3.example.com"));
        assert_eq!(config.access_key_id.as_deref(), Some("ak"));
        assert!(!config.virtual_host_style);
    }

    #[test]
    fn from_backend_config_keeps_port() {
        let backend = BackendConfig::new("http://data.localhost:9000", "ak", "sk");
        let config = S3Config::from_backend_config(&backend).unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:9000"));
    }

    #[test]
    fn from_backend_config_rejects_bare_host() {
        let backend = BackendConfig::new("https://localhost", "ak", "sk");
        let err = S3Config::from_backend_config(&backend).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn addressing_style_builds_operator() {
        let config = S3Config::new("photos", "cn-east-1")
            .with_endpoint("https://cn-east-1-s3.qiniu.com")
            .with_credentials("ak", "sk");

        for enabled in [true, false] {
            let config = config.clone().with_virtual_host_style(enabled);
            assert_eq!(config.virtual_host_style, enabled);
            assert!(crate::S3Storage::new(config).is_ok());
        }
    }

    #[test]
    fn debug_hides_secret() {
        let config = S3Config::new("b", "r").with_credentials("ak", "hidden-secret");
        assert!(!format!("{config:?}").contains("hidden-secret"));
    }
}
