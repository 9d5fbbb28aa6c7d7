//! Remote video download collaborator.
//!
//! Streams the response body to the staging path, enforcing the size cap
//! while reading so an oversized or lying server fails the request early
//! instead of filling the disk. The request timeout is configured on the
//! shared client.

use anyhow::{bail, Context, Result};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::info;

pub async fn download_video(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    max_bytes: u64,
) -> Result<()> {
    info!("Downloading video from {url}");

    let mut response = client
        .get(url)
        .send()
        .await
        .context("request failed")?
        .error_for_status()
        .context("server returned an error status")?;

    if let Some(length) = response.content_length() {
        if length > max_bytes {
            bail!("remote file is {length} bytes, exceeding the {max_bytes} byte limit");
        }
    }

    let mut file = tokio::fs::File::create(dest)
        .await
        .with_context(|| format!("failed to create {}", dest.display()))?;

    let mut written: u64 = 0;
    while let Some(chunk) = response
        .chunk()
        .await
        .context("failed reading response body")?
    {
        written += chunk.len() as u64;
        if written > max_bytes {
            bail!("download exceeded the {max_bytes} byte limit");
        }
        file.write_all(&chunk)
            .await
            .context("failed writing staging file")?;
    }
    file.flush().await.context("failed flushing staging file")?;

    info!("Downloaded {written} bytes to {}", dest.display());
    Ok(())
}
