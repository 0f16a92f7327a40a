use super::{ChannelReader, Period};
use crate::Result;
use crate::progress::Progress;
use bytes::Bytes;
use chrono::NaiveDate;
use core::sync::atomic::{AtomicU64, Ordering};
use core::time::Duration;
use futures_util::StreamExt;
use ohno::{IntoAppError, bail};
use reqwest::Client;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use url::Url;

/// Log target for archive downloads
const LOG_TARGET: &str = "  download";

// Chunks received from the network are handed to a blocking writer through a bounded channel.
// When the disk falls behind, the channel fills up and the download pauses.
const NUM_CHANNEL_BUFFERS: usize = 64;

/// Where the street directory archives are published.
#[derive(Debug, Clone)]
pub struct ArchiveSource {
    client: Client,
    base_url: Url,
}

impl ArchiveSource {
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("callejero/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .into_app_err("unable to create HTTP client")?;

        // Url::join replaces the last path segment unless the base ends with a slash
        let mut base_url = base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn archive_url(&self, period: Period) -> Result<Url> {
        self.base_url
            .join(&period.archive_name())
            .into_app_err_with(|| format!("unable to build archive URL for period {period}"))
    }

    /// Probes the candidate periods for `today`, newest first, and returns the first one
    /// whose archive answers a HEAD request with success.
    pub async fn find_latest(&self, today: NaiveDate) -> Result<Period> {
        let mut failures = Vec::new();

        for period in Period::candidates(today) {
            let url = self.archive_url(period)?;
            log::debug!(target: LOG_TARGET, "Probing {url}");

            match self.client.head(url.clone()).send().await {
                Ok(response) if response.status().is_success() => {
                    log::info!(target: LOG_TARGET, "Found street directory archive for period {period}");
                    return Ok(period);
                }
                Ok(response) => failures.push(format!("{url}: HTTP {}", response.status())),
                Err(e) => failures.push(format!("{url}: {e}")),
            }
        }

        bail!("no street directory archive is available ({})", failures.join("; "));
    }

    /// Streams the archive of `period` into `dest_dir` and returns the path of the file.
    ///
    /// The data is written to a `.part` file that is renamed once complete, so an interrupted
    /// download never leaves a truncated archive behind under the final name.
    pub async fn download(&self, period: Period, dest_dir: &Path, progress: Arc<dyn Progress>) -> Result<PathBuf> {
        let url = self.archive_url(period)?;
        let start = Instant::now();
        log::info!(target: LOG_TARGET, "Downloading {url}");

        fs::create_dir_all(dest_dir).into_app_err_with(|| format!("unable to create directory '{}'", dest_dir.display()))?;
        let final_path = dest_dir.join(period.archive_name());
        let part_path = dest_dir.join(format!("{}.part", period.archive_name()));

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .into_app_err_with(|| format!("unable to start downloading {url}"))?;

        if !response.status().is_success() {
            bail!("unable to download {url}: HTTP {}", response.status());
        }

        let content_length = response.content_length();
        let downloaded_bytes = Arc::new(AtomicU64::new(0));
        let downloaded_bytes_clone = Arc::clone(&downloaded_bytes);

        if let Some(total) = content_length {
            progress.set_determinate(Box::new(move || {
                let downloaded_bytes = downloaded_bytes_clone.load(Ordering::Relaxed);
                let message = format!(
                    "{}/{} MB: Downloading street directory",
                    downloaded_bytes / (1024 * 1024),
                    total / (1024 * 1024)
                );
                (total, downloaded_bytes, message)
            }));
        } else {
            progress.set_indeterminate(Box::new(move || {
                let downloaded_mb = downloaded_bytes_clone.load(Ordering::Relaxed) / (1024 * 1024);
                format!("{downloaded_mb} MB: Downloading street directory")
            }));
        }

        let (tx, rx) = mpsc::channel::<Result<Bytes>>(NUM_CHANNEL_BUFFERS);
        let writer_path = part_path.clone();
        let writer_handle = tokio::task::spawn_blocking(move || write_download(rx, &writer_path));
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => {
                    let _ = downloaded_bytes.fetch_add(bytes.len() as u64, Ordering::Relaxed);

                    if tx.send(Ok(bytes)).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e.into())).await;
                    break;
                }
            }
        }

        drop(tx);
        let written = match writer_handle.await.into_app_err("download writer task panicked")? {
            Ok(written) => written,
            Err(e) => {
                let _ = fs::remove_file(&part_path);
                return Err(e);
            }
        };

        fs::rename(&part_path, &final_path).into_app_err_with(|| format!("unable to move download into '{}'", final_path.display()))?;

        log::debug!(
            target: LOG_TARGET,
            "Downloaded {written} bytes to '{}' in {:.3}s",
            final_path.display(),
            start.elapsed().as_secs_f64()
        );

        Ok(final_path)
    }
}

fn write_download(rx: mpsc::Receiver<Result<Bytes>>, path: &Path) -> Result<u64> {
    let file = File::create(path).into_app_err_with(|| format!("unable to create '{}'", path.display()))?;
    let mut writer = BufWriter::with_capacity(1024 * 1024, file);
    let mut reader = ChannelReader::new(rx);

    let written = std::io::copy(&mut reader, &mut writer).into_app_err("unable to save street directory archive")?;
    writer.flush()?;
    Ok(written)
}
