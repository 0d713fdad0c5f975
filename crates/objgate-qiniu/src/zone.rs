//! Kodo zones and their service hosts.

use serde::{Deserialize, Serialize};

/// Data-center zone used by the Kodo REST protocol.
///
/// Distinct from the human-readable region identifier used by the
/// S3-compatible API; see [`Zone::from_region`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    /// East China (`z0`).
    #[default]
    East,
    /// North China (`z1`).
    North,
    /// South China (`z2`).
    South,
    /// North America (`na0`).
    NorthAmerica,
}

impl Zone {
    /// Looks up the zone for a region identifier.
    ///
    /// Unknown regions fall back to [`Zone::East`] (code `0`).
    pub fn from_region(region: &str) -> Self {
        match region {
            "cn-east-1" => Self::East,
            "cn-north-1" => Self::North,
            "cn-south-1" => Self::South,
            "us-west-1" => Self::NorthAmerica,
            _ => Self::default(),
        }
    }

    /// Provider integer code for this zone.
    pub fn code(self) -> u8 {
        match self {
            Self::East => 0,
            Self::North => 1,
            Self::South => 2,
            Self::NorthAmerica => 3,
        }
    }

    /// Default service hosts for this zone.
    pub fn hosts(self) -> ZoneHosts {
        let (rs, rsf, up) = match self {
            Self::East => ("rs.qiniu.com", "rsf.qiniu.com", "up.qiniup.com"),
            Self::North => ("rs-z1.qiniu.com", "rsf-z1.qiniu.com", "up-z1.qiniup.com"),
            Self::South => ("rs-z2.qiniu.com", "rsf-z2.qiniu.com", "up-z2.qiniup.com"),
            Self::NorthAmerica => ("rs-na0.qiniu.com", "rsf-na0.qiniu.com", "up-na0.qiniup.com"),
        };

        ZoneHosts {
            rs: format!("https://{rs}"),
            rsf: format!("https://{rsf}"),
            up: format!("https://{up}"),
        }
    }
}

/// Base URLs of the Kodo REST services for one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneHosts {
    /// Resource management (stat, copy, delete).
    pub rs: String,
    /// Resource listing.
    pub rsf: String,
    /// Uploads.
    pub up: String,
}

impl ZoneHosts {
    /// Points every service at the same base URL.
    pub fn single(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            rs: base.clone(),
            rsf: base.clone(),
            up: base,
        }
    }
}
