//! CLI configuration.
//!
//! ```text
//! Cli
//! ├── storage: String          # registered backend name
//! ├── backend: BackendConfig   # endpoint, keys, download domain
//! └── command: Command         # ls / get / put / cp / rm / stat
//! ```
//!
//! Every option can be provided via CLI arguments or environment variables.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use objgate_core::BackendConfig;

use crate::TRACING_TARGET_CONFIG;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "objgate")]
#[command(about = "Object storage client for Qiniu Kodo and S3-compatible services")]
#[command(version)]
pub struct Cli {
    /// Storage backend to use.
    #[arg(long = "storage", env = "OBJGATE_STORAGE", default_value = "qiniu")]
    pub storage: String,

    /// Backend endpoint and credentials.
    #[clap(flatten)]
    pub backend: BackendConfig,

    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Storage operations.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List objects under a prefix.
    Ls {
        /// Key prefix.
        #[arg(default_value = "")]
        prefix: String,
        /// Page size.
        #[arg(long, default_value_t = 1000)]
        limit: usize,
    },
    /// Download an object, or a byte range of it.
    Get {
        /// Object key.
        key: String,
        /// First byte to read.
        #[arg(long, default_value_t = 0)]
        offset: u64,
        /// Number of bytes to read; non-positive reads to the end.
        #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
        limit: i64,
        /// Write to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Upload a local file.
    Put {
        /// Object key.
        key: String,
        /// Local file to upload.
        file: PathBuf,
    },
    /// Copy an object within the bucket.
    Cp {
        /// Source key.
        src: String,
        /// Destination key.
        dst: String,
    },
    /// Delete an object.
    Rm {
        /// Object key.
        key: String,
    },
    /// Check that an object exists.
    Stat {
        /// Object key.
        key: String,
    },
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Logs the resolved configuration. The secret key is masked.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            storage = %self.storage,
            endpoint = %self.backend.endpoint,
            access_key = %self.backend.access_key,
            domain = ?self.backend.domain(),
            "backend configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let base = [
            "objgate",
            "--endpoint",
            "https://photos.cn-east-1-s3.qiniu.com",
            "--access-key",
            "ak",
            "--secret-key",
            "sk",
        ];
        Cli::try_parse_from(base.iter().chain(args)).unwrap()
    }

    #[test]
    fn defaults() {
        let cli = parse(&["ls"]);
        assert_eq!(cli.storage, "qiniu");
        assert_eq!(cli.backend.secret_key, "sk");
        assert_eq!(
            cli.command,
            Command::Ls {
                prefix: String::new(),
                limit: 1000
            }
        );
    }

    #[test]
    fn get_with_range_and_output() {
        let cli = parse(&[
            "--domain",
            "cdn.example.com",
            "get",
            "/raw/key",
            "--offset",
            "10",
            "--limit",
            "5",
            "-o",
            "out.bin",
        ]);
        assert_eq!(cli.backend.domain(), Some("cdn.example.com"));
        assert_eq!(
            cli.command,
            Command::Get {
                key: "/raw/key".into(),
                offset: 10,
                limit: 5,
                output: Some(PathBuf::from("out.bin")),
            }
        );
    }

    #[test]
    fn negative_limit_is_accepted() {
        let cli = parse(&["get", "k", "--limit", "-1"]);
        assert!(matches!(cli.command, Command::Get { limit: -1, .. }));
    }

    #[test]
    fn copy_arguments() {
        let cli = parse(&["--storage", "s3", "cp", "a", "b"]);
        assert_eq!(cli.storage, "s3");
        assert_eq!(
            cli.command,
            Command::Cp {
                src: "a".into(),
                dst: "b".into()
            }
        );
    }
}
