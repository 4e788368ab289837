//! Seams to the host platform
//!
//! Policy code only talks to these traits. `webview` and `permissions` hold the
//! Tauri-backed implementations.

mod permissions;
mod webview;

pub use permissions::HostPermissions;
pub use webview::{DialogPrompt, TauriCookies, TauriMainThread, TauriNotifier, TauriOpener};

use url::Url;

use crate::download::{DownloadId, PersistedDownload};
use crate::error::ShellResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLength {
    Short,
    Long,
}

impl ToastLength {
    pub fn millis(self) -> u64 {
        match self {
            ToastLength::Short => 2000,
            ToastLength::Long => 3500,
        }
    }
}

/// Short transient user-facing messages.
pub trait Notifier: Send + Sync {
    fn show(&self, message: &str, length: ToastLength);
}

/// Persistent background download service. Owns a transfer once accepted.
pub trait DownloadService: Send + Sync {
    fn enqueue(&self, download: PersistedDownload) -> ShellResult<DownloadId>;
}

/// Cookie jar shared with the webview.
pub trait CookieSource: Send + Sync {
    /// `Cookie` header value for `url`, if any cookies apply.
    fn cookie_header(&self, url: &Url) -> Option<String>;
}

/// Write-storage permission.
pub trait PermissionGate: Send + Sync {
    /// Whether the host demands an explicit grant before public downloads.
    fn requires_storage_permission(&self) -> bool;
    fn storage_permission_granted(&self) -> bool;
    /// Ask the host. The outcome arrives later through the shell.
    fn request_storage_permission(&self);
}

/// Asks the user a yes/no permission question.
pub trait PermissionPrompt: Send + Sync {
    /// `on_answer` runs once, whenever the user answers.
    fn ask(&self, on_answer: Box<dyn FnOnce(bool) + Send + 'static>);
}

/// Generic document/URL opener outside the app.
pub trait ExternalOpener: Send + Sync {
    fn open(&self, url: &str) -> ShellResult<()>;
}

/// Posts work onto the UI thread.
pub trait MainThread: Send + Sync + 'static {
    fn post(&self, task: Box<dyn FnOnce() + Send + 'static>) -> ShellResult<()>;
}
