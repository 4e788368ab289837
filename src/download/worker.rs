//! Desktop download service - background transfers with streaming writes

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::StreamExt;
use log::{error, info};
use reqwest::Client;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::types::{DownloadFinished, DownloadId, PersistedDownload};
use crate::error::{ShellError, ShellResult};
use crate::host::DownloadService;

/// Write buffer size for downloads (2 MB) - reduces I/O operations
const WRITE_BUFFER_SIZE: usize = 2 * 1024 * 1024;

const PARTIAL_SUFFIX: &str = ".part";

const MAX_NAME_ATTEMPTS: u32 = 10_000;

pub type FinishedCallback = Arc<dyn Fn(DownloadFinished) + Send + Sync>;

/// Fire-and-forget transfers into the public downloads directory.
pub struct TransferService {
    client: Client,
    downloads_dir: PathBuf,
    on_finished: FinishedCallback,
    next_id: AtomicU64,
}

impl TransferService {
    pub fn new(downloads_dir: PathBuf, on_finished: FinishedCallback) -> Self {
        Self {
            client: Client::new(),
            downloads_dir,
            on_finished,
            next_id: AtomicU64::new(1),
        }
    }
}

impl DownloadService for TransferService {
    fn enqueue(&self, download: PersistedDownload) -> ShellResult<DownloadId> {
        let id = DownloadId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let client = self.client.clone();
        let dir = self.downloads_dir.clone();
        let on_finished = self.on_finished.clone();

        tauri::async_runtime::spawn(async move {
            let result = fetch_to_dir(&client, &download, &dir).await;
            let event = match result {
                Ok(path) => {
                    info!("Download {}: saved {}", id.0, path.display());
                    DownloadFinished {
                        id,
                        url: download.url.to_string(),
                        file_name: file_name_of(&path, &download),
                        path: Some(path.to_string_lossy().to_string()),
                        success: true,
                        error: None,
                    }
                }
                Err(e) => {
                    error!("Download {}: {} failed: {}", id.0, download.url, e);
                    DownloadFinished {
                        id,
                        url: download.url.to_string(),
                        file_name: download.destination.file_name.clone(),
                        path: None,
                        success: false,
                        error: Some(e.to_string()),
                    }
                }
            };
            on_finished(event);
        });

        Ok(id)
    }
}

fn file_name_of(path: &Path, download: &PersistedDownload) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| download.destination.file_name.clone())
}

/// Download `download` into `dir`, returning the final path.
///
/// The final name is reserved with an exclusive create before any bytes are
/// written, so concurrent transfers never share a destination. The body is
/// streamed into `<name>.part` and renamed over the reservation on success.
pub async fn fetch_to_dir(
    client: &Client,
    download: &PersistedDownload,
    dir: &Path,
) -> ShellResult<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let mut request = client.get(download.url.clone());
    for (name, value) in &download.headers {
        if value.is_empty() {
            continue;
        }
        request = request.header(name.as_str(), value.as_str());
    }

    let response = request.send().await?;
    if !response.status().is_success() {
        let status = response.status();
        return Err(ShellError::Submission(format!(
            "server responded {} for {}",
            status, download.url
        )));
    }

    let destination = reserve_destination(dir, &download.destination.file_name).await?;
    let partial = partial_path(&destination);

    if let Err(e) = write_body(response, &partial).await {
        let _ = tokio::fs::remove_file(&partial).await;
        let _ = tokio::fs::remove_file(&destination).await;
        return Err(e);
    }

    if let Err(e) = tokio::fs::rename(&partial, &destination).await {
        let _ = tokio::fs::remove_file(&partial).await;
        let _ = tokio::fs::remove_file(&destination).await;
        return Err(e.into());
    }
    Ok(destination)
}

async fn write_body(response: reqwest::Response, partial: &Path) -> ShellResult<()> {
    let mut file = File::create(partial).await?;
    let mut stream = response.bytes_stream();
    let mut write_buffer = Vec::with_capacity(WRITE_BUFFER_SIZE);

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result?;
        write_buffer.extend_from_slice(&chunk);

        if write_buffer.len() >= WRITE_BUFFER_SIZE {
            file.write_all(&write_buffer).await?;
            write_buffer.clear();
        }
    }

    if !write_buffer.is_empty() {
        file.write_all(&write_buffer).await?;
    }
    file.flush().await?;
    Ok(())
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

/// Claim `dir/name`, or `dir/stem (n).ext` for the first free `n`.
///
/// The claim is an empty file created with `create_new`, so two callers can
/// never end up with the same path.
pub async fn reserve_destination(dir: &Path, file_name: &str) -> std::io::Result<PathBuf> {
    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{ext}")),
        _ => (file_name, String::new()),
    };

    for n in 0..MAX_NAME_ATTEMPTS {
        let candidate = if n == 0 {
            dir.join(file_name)
        } else {
            dir.join(format!("{stem} ({n}){ext}"))
        };
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await
        {
            Ok(_) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }

    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free name for {} in {}", file_name, dir.display()),
    ))
}
