//! Subcommand execution.

use std::path::Path;

use anyhow::Context;
use objgate_core::{Object, ObjectReader, ObjectStorage};
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::TRACING_TARGET_COMMAND;
use crate::config::Command;

/// Runs `command` against `storage`, writing listings and downloads to `out`.
pub async fn execute<W>(
    storage: &dyn ObjectStorage,
    command: Command,
    out: &mut W,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    match command {
        Command::Ls { prefix, limit } => list(storage, &prefix, limit, out).await,
        Command::Get {
            key,
            offset,
            limit,
            output,
        } => {
            let mut reader = storage
                .get(&key, offset, limit)
                .await
                .with_context(|| format!("failed to read {key}"))?;

            let copied = match output {
                Some(path) => download_to_file(&mut reader, &path).await?,
                None => tokio::io::copy(&mut reader, out).await?,
            };
            out.flush().await?;

            tracing::info!(
                target: TRACING_TARGET_COMMAND,
                key = %key,
                bytes = copied,
                "object downloaded"
            );
            Ok(())
        }
        Command::Put { key, file } => {
            let source = File::open(&file)
                .await
                .with_context(|| format!("failed to open {}", file.display()))?;
            let body: ObjectReader = Box::pin(source);
            storage
                .put(&key, body)
                .await
                .with_context(|| format!("failed to upload {key}"))?;

            tracing::info!(target: TRACING_TARGET_COMMAND, key = %key, "object uploaded");
            Ok(())
        }
        Command::Cp { src, dst } => {
            storage
                .copy(&dst, &src)
                .await
                .with_context(|| format!("failed to copy {src} to {dst}"))?;

            tracing::info!(
                target: TRACING_TARGET_COMMAND,
                src = %src,
                dst = %dst,
                "object copied"
            );
            Ok(())
        }
        Command::Rm { key } => {
            storage
                .delete(&key)
                .await
                .with_context(|| format!("failed to delete {key}"))?;

            tracing::info!(target: TRACING_TARGET_COMMAND, key = %key, "object deleted");
            Ok(())
        }
        Command::Stat { key } => {
            storage
                .exists(&key)
                .await
                .with_context(|| format!("failed to stat {key}"))?;

            out.write_all(format!("{key}\n").as_bytes()).await?;
            out.flush().await?;
            Ok(())
        }
    }
}

/// Pages through `prefix` until the backend returns an empty page.
///
/// An empty page is taken as the end of the listing. Backends must not
/// return empty intermediate pages; the Qiniu adapter follows Kodo's empty
/// pages that carry a marker before answering.
async fn list<W>(
    storage: &dyn ObjectStorage,
    prefix: &str,
    limit: usize,
    out: &mut W,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    anyhow::ensure!(limit > 0, "page size must be positive");

    let mut marker = String::new();
    let mut total = 0usize;
    loop {
        let page = storage
            .list(prefix, &marker, limit)
            .await
            .with_context(|| format!("failed to list {prefix:?}"))?;
        let Some(last) = page.last() else {
            break;
        };
        marker = last.key.clone();
        total += page.len();

        for object in &page {
            out.write_all(format_object(object).as_bytes()).await?;
        }
    }
    out.flush().await?;

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        prefix = %prefix,
        count = total,
        "listing complete"
    );
    Ok(())
}

async fn download_to_file(reader: &mut ObjectReader, path: &Path) -> anyhow::Result<u64> {
    let mut file = File::create(path)
        .await
        .with_context(|| format!("failed to create {}", path.display()))?;
    let copied = tokio::io::copy(reader, &mut file).await?;
    file.flush().await?;
    Ok(copied)
}

fn format_object(object: &Object) -> String {
    format!("{:>12}  {}  {}\n", object.size, object.modified, object.key)
}
