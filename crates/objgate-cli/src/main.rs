#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod commands;
mod config;
mod telemetry;

use std::process;

use anyhow::Context;
use objgate_core::BackendRegistry;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "objgate_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "objgate_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "objgate_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "objgate_cli::command";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %format!("{error:#}"),
            "command failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing()?;
    log_startup_info();
    cli.log();

    let registry = backend_registry();
    let storage = registry
        .create(&cli.storage, &cli.backend)
        .with_context(|| format!("failed to create {} backend", cli.storage))?;

    let mut stdout = tokio::io::stdout();
    commands::execute(storage.as_ref(), cli.command, &mut stdout).await
}

/// Registers every backend compiled into the binary.
fn backend_registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    registry
        .register("qiniu", objgate_qiniu::create)
        .register("s3", objgate_s3::create);
    registry
}

/// Logs startup information.
fn log_startup_info() {
    tracing::debug!(
        target: TRACING_TARGET_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        pid = process::id(),
        features = ?enabled_features(),
        "starting objgate"
    );
}

/// Returns a list of enabled compile-time features.
fn enabled_features() -> Vec<&'static str> {
    [cfg!(feature = "dotenv").then_some("dotenv")]
        .into_iter()
        .flatten()
        .collect()
}
