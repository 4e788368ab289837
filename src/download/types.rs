//! Download request types and event payloads

use serde::Serialize;
use url::Url;

use super::filename::guess_file_name;
use crate::error::{ShellError, ShellResult};

/// Description shown by the download service while a transfer runs.
pub const DOWNLOAD_DESCRIPTION: &str = "Downloading...";

/// Where a filename suggestion came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilenameHint {
    /// Raw `Content-Disposition` header value.
    ContentDisposition(String),
    /// A name chosen by the page.
    Filename(String),
    None,
}

/// A download as first identified, before cookies and headers are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadIntent {
    pub url: String,
    pub hint: FilenameHint,
    pub mime_type: String,
}

/// A resolved download. Built once per trigger and consumed by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    url: Url,
    file_name: String,
    mime_type: String,
    cookie: String,
    user_agent: String,
}

impl DownloadRequest {
    /// `url` is the already validated form of `intent.url`.
    pub fn resolve(
        url: Url,
        intent: DownloadIntent,
        cookie: Option<String>,
        user_agent: &str,
    ) -> Self {
        let file_name = guess_file_name(url.as_str(), &intent.hint, Some(&intent.mime_type));
        Self {
            url,
            file_name,
            mime_type: intent.mime_type,
            cookie: cookie.unwrap_or_default(),
            user_agent: user_agent.to_string(),
        }
    }
}

/// Parse and validate a download source URL.
pub fn parse_download_url(raw: &str) -> ShellResult<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ShellError::InvalidUrl("empty url".to_string()));
    }
    let url = Url::parse(trimmed).map_err(|e| ShellError::InvalidUrl(format!("{trimmed}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ShellError::InvalidUrl(format!(
            "unsupported scheme '{other}' in {trimmed}"
        ))),
    }
}

/// When the download service surfaces a transfer to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotificationVisibility {
    /// While running and after completion.
    VisibleNotifyCompleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PublicDirectory {
    Downloads,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub directory: PublicDirectory,
    pub file_name: String,
}

/// The request submitted to the persistent download service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedDownload {
    pub url: Url,
    pub title: String,
    pub description: String,
    pub visibility: NotificationVisibility,
    pub mime_type: String,
    pub headers: Vec<(String, String)>,
    pub destination: Destination,
}

impl PersistedDownload {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl From<DownloadRequest> for PersistedDownload {
    fn from(request: DownloadRequest) -> Self {
        Self {
            url: request.url,
            title: request.file_name.clone(),
            description: DOWNLOAD_DESCRIPTION.to_string(),
            visibility: NotificationVisibility::VisibleNotifyCompleted,
            mime_type: request.mime_type,
            headers: vec![
                ("Cookie".to_string(), request.cookie),
                ("User-Agent".to_string(), request.user_agent),
            ],
            destination: Destination {
                directory: PublicDirectory::Downloads,
                file_name: request.file_name,
            },
        }
    }
}

/// Identifier handed out by the download service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DownloadId(pub u64);

/// Completion event payload, emitted as `download-finished`
#[derive(Debug, Clone, Serialize)]
pub struct DownloadFinished {
    pub id: DownloadId,
    pub url: String,
    pub file_name: String,
    pub path: Option<String>,
    pub success: bool,
    pub error: Option<String>,
}
