//! Request signing for the Kodo protocols.
//!
//! Every token is an HMAC-SHA1 over some request-specific data, keyed with
//! the secret key and rendered as URL-safe base64 (with padding).

use std::fmt;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use hmac::{Hmac, Mac};
use jiff::Timestamp;
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Default lifetime of upload tokens and private download URLs.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Access/secret key pair used to sign Kodo requests.
#[derive(Clone)]
pub struct Credentials {
    access_key: String,
    secret_key: String,
}

impl Credentials {
    /// Creates a credential pair.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Signs `data`, returning `<access key>:<signature>`.
    pub fn sign(&self, data: &[u8]) -> String {
        let mut mac = HmacSha1::new_from_slice(self.secret_key.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(data);
        let digest = mac.finalize().into_bytes();
        format!("{}:{}", self.access_key, URL_SAFE.encode(digest))
    }

    /// Builds the `Authorization` header value for a management request.
    ///
    /// The signed data is the request path, the query string when present,
    /// and a trailing newline. Requests are sent without a form body.
    pub fn management_token(&self, path_and_query: &str) -> String {
        let mut data = path_and_query.as_bytes().to_vec();
        data.push(b'\n');
        format!("QBox {}", self.sign(&data))
    }

    /// Builds an upload token scoped to `bucket:key`, valid for `ttl`.
    pub fn upload_token(&self, bucket: &str, key: &str, ttl: Duration) -> String {
        let policy = serde_json::json!({
            "scope": format!("{bucket}:{key}"),
            "deadline": deadline(ttl),
        });
        let encoded = URL_SAFE.encode(policy.to_string());
        format!("{}:{encoded}", self.sign(encoded.as_bytes()))
    }

    /// Appends an expiry and signature to `base_url`, producing a private
    /// download URL valid for `ttl`.
    pub fn private_url(&self, base_url: &str, ttl: Duration) -> String {
        let separator = if base_url.contains('?') { '&' } else { '?' };
        let url = format!("{base_url}{separator}e={}", deadline(ttl));
        let token = self.sign(url.as_bytes());
        format!("{url}&token={token}")
    }
}

/// Unix deadline `ttl` from now.
fn deadline(ttl: Duration) -> i64 {
    Timestamp::now().as_second() + ttl.as_secs() as i64
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("test-ak", "test-sk")
    }

    fn decode(part: &str) -> Vec<u8> {
        URL_SAFE.decode(part).unwrap()
    }

    #[test]
    fn sign_is_deterministic_and_keyed() {
        let creds = credentials();
        let first = creds.sign(b"payload");
        assert_eq!(first, creds.sign(b"payload"));
        assert!(first.starts_with("test-ak:"));

        let other = Credentials::new("test-ak", "other-sk").sign(b"payload");
        assert_ne!(first, other);

        // SHA-1 digests are 20 bytes.
        let signature = first.strip_prefix("test-ak:").unwrap();
        assert_eq!(decode(signature).len(), 20);
    }

    #[test]
    fn management_token_signs_path_and_newline() {
        let creds = credentials();
        let token = creds.management_token("/stat/abc");
        assert_eq!(token, format!("QBox {}", creds.sign(b"/stat/abc\n")));
    }

    #[test]
    fn upload_token_embeds_policy() {
        let token = credentials().upload_token("bucket", "dir/key", DEFAULT_TOKEN_TTL);
        let parts: Vec<_> = token.split(':').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "test-ak");

        let policy: serde_json::Value = serde_json::from_slice(&decode(parts[2])).unwrap();
        assert_eq!(policy["scope"], "bucket:dir/key");
        assert!(policy["deadline"].as_i64().unwrap() > Timestamp::now().as_second());
    }

    #[test]
    fn private_url_appends_expiry_and_token() {
        let creds = credentials();
        let url = creds.private_url("http://cdn.example.com//a/b", DEFAULT_TOKEN_TTL);

        let (unsigned, token) = url.split_once("&token=").unwrap();
        assert!(unsigned.starts_with("http://cdn.example.com//a/b?e="));
        assert_eq!(token, creds.sign(unsigned.as_bytes()));
    }

    #[test]
    fn private_url_respects_existing_query() {
        let url = credentials().private_url("http://cdn.example.com/a?v=1", DEFAULT_TOKEN_TTL);
        assert!(url.starts_with("http://cdn.example.com/a?v=1&e="));
    }

    #[test]
    fn debug_hides_secret() {
        assert!(!format!("{:?}", credentials()).contains("test-sk"));
    }
}
