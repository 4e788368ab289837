//! Turns download intents into submissions to the host download service

use std::sync::Arc;

use log::{error, info};

use super::types::{DownloadId, DownloadIntent, DownloadRequest, PersistedDownload};
use crate::error::ShellResult;
use crate::host::{CookieSource, DownloadService, Notifier, PermissionGate, ToastLength};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Permission was missing and has been requested. Nothing was submitted.
    PermissionRequested,
    Enqueued(DownloadId),
    Failed(String),
}

pub struct DownloadDispatcher {
    service: Arc<dyn DownloadService>,
    cookies: Arc<dyn CookieSource>,
    permissions: Arc<dyn PermissionGate>,
    notifier: Arc<dyn Notifier>,
    user_agent: String,
}

impl DownloadDispatcher {
    pub fn new(
        service: Arc<dyn DownloadService>,
        cookies: Arc<dyn CookieSource>,
        permissions: Arc<dyn PermissionGate>,
        notifier: Arc<dyn Notifier>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            service,
            cookies,
            permissions,
            notifier,
            user_agent: user_agent.into(),
        }
    }

    /// Dispatch one download. Must be called on the UI thread.
    ///
    /// There is no queue: when permission is missing the attempt is dropped
    /// and the user has to trigger it again after granting.
    pub fn dispatch(&self, intent: DownloadIntent) -> DispatchOutcome {
        if self.permissions.requires_storage_permission()
            && !self.permissions.storage_permission_granted()
        {
            info!("Download: storage permission missing, requesting ({})", intent.url);
            self.permissions.request_storage_permission();
            return DispatchOutcome::PermissionRequested;
        }

        match self.submit(intent) {
            Ok(id) => {
                self.notifier.show("Download started", ToastLength::Short);
                DispatchOutcome::Enqueued(id)
            }
            Err(e) => {
                error!("Download: submission failed: {}", e);
                self.notifier
                    .show(&format!("Download failed: {}", e), ToastLength::Long);
                DispatchOutcome::Failed(e.to_string())
            }
        }
    }

    fn submit(&self, intent: DownloadIntent) -> ShellResult<DownloadId> {
        let url = super::types::parse_download_url(&intent.url)?;
        let cookie = self.cookies.cookie_header(&url);
        let request = DownloadRequest::resolve(url, intent, cookie, &self.user_agent);
        let download = PersistedDownload::from(request);

        info!(
            "Download: enqueue {} as {}",
            download.url, download.destination.file_name
        );
        self.service.enqueue(download)
    }
}
