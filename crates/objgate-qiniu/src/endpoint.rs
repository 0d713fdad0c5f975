//! Endpoint resolution.

use objgate_core::{StorageError, StorageResult};
use url::Url;

use crate::zone::Zone;

/// Bucket, region and zone derived from a single endpoint URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Bucket name (first host label).
    pub bucket: String,
    /// Region identifier, e.g. `cn-east-1`.
    pub region: String,
    /// Kodo zone looked up from the region.
    pub zone: Zone,
    /// Base URL of the S3-compatible service, e.g. `https://cn-east-1-s3.qiniu.com`.
    /// Always `https`.
    pub service_url: String,
}

impl Endpoint {
    /// Parses `<scheme>://<bucket>.<region>-<provider domain>`.
    ///
    /// A malformed endpoint is a configuration error that cannot be fixed once
    /// requests are being served; callers should treat it as fatal.
    pub fn parse(endpoint: &str) -> StorageResult<Self> {
        let invalid = |reason: &str| StorageError::invalid_endpoint(endpoint, reason);

        let url = Url::parse(endpoint).map_err(|e| invalid(&e.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(invalid("not an absolute URL"));
        }

        let host = url.host_str().ok_or_else(|| invalid("missing host"))?;
        let (bucket, service) = host
            .split_once('.')
            .ok_or_else(|| invalid("expected <bucket>.<region>-<domain>"))?;
        if bucket.is_empty() {
            return Err(invalid("empty bucket name"));
        }

        let region = service
            .rfind('-')
            .map(|idx| &service[..idx])
            .filter(|region| !region.is_empty())
            .ok_or_else(|| invalid("cannot derive region from host"))?;

        // The S3-compatible API is only reached over TLS, whatever the input scheme.
        let service_url = match url.port() {
            Some(port) => format!("https://{service}:{port}"),
            None => format!("https://{service}"),
        };

        Ok(Self {
            bucket: bucket.to_string(),
            region: region.to_string(),
            zone: Zone::from_region(region),
            service_url,
        })
    }
}
