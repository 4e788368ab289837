//! Tauri-backed host collaborators

use log::{debug, info, warn};
use tauri::{AppHandle, Manager};
use tauri_plugin_dialog::{DialogExt, MessageDialogButtons, MessageDialogKind};
use tauri_plugin_opener::OpenerExt;
use url::Url;

use super::{CookieSource, ExternalOpener, MainThread, Notifier, PermissionPrompt, ToastLength};
use crate::config::MAIN_WINDOW_LABEL;
use crate::error::{ShellError, ShellResult};
use crate::inject::toast_script;

/// Transient overlay in the main window.
pub struct TauriNotifier {
    app: AppHandle,
}

impl TauriNotifier {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl Notifier for TauriNotifier {
    fn show(&self, message: &str, length: ToastLength) {
        info!("Toast: {}", message);
        let Some(window) = self.app.get_webview_window(MAIN_WINDOW_LABEL) else {
            warn!("Toast: main window is gone");
            return;
        };
        if let Err(e) = window.eval(&toast_script(message, length)) {
            warn!("Toast: eval failed: {}", e);
        }
    }
}

/// Reads the webview's cookie store.
pub struct TauriCookies {
    app: AppHandle,
}

impl TauriCookies {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl CookieSource for TauriCookies {
    #[cfg(not(target_os = "windows"))]
    fn cookie_header(&self, url: &Url) -> Option<String> {
        let window = self.app.get_webview_window(MAIN_WINDOW_LABEL)?;
        match window.cookies_for_url(url.clone()) {
            Ok(cookies) if cookies.is_empty() => None,
            Ok(cookies) => Some(
                cookies
                    .iter()
                    .map(|c| format!("{}={}", c.name(), c.value()))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            Err(e) => {
                warn!("Cookies: lookup for {} failed: {}", url, e);
                None
            }
        }
    }

    // WebView2 blocks on cookie reads issued from the UI thread.
    #[cfg(target_os = "windows")]
    fn cookie_header(&self, url: &Url) -> Option<String> {
        let _ = &self.app;
        debug!("Cookies: not read on this platform ({})", url);
        None
    }
}

pub struct TauriOpener {
    app: AppHandle,
}

impl TauriOpener {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl ExternalOpener for TauriOpener {
    fn open(&self, url: &str) -> ShellResult<()> {
        debug!("Opener: {}", url);
        self.app
            .opener()
            .open_url(url, None::<&str>)
            .map_err(|e| ShellError::Submission(format!("cannot open {}: {}", url, e)))
    }
}

#[derive(Clone)]
pub struct TauriMainThread {
    app: AppHandle,
}

impl TauriMainThread {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl MainThread for TauriMainThread {
    fn post(&self, task: Box<dyn FnOnce() + Send + 'static>) -> ShellResult<()> {
        self.app.run_on_main_thread(task)?;
        Ok(())
    }
}

/// Storage consent asked through a native message dialog.
pub struct DialogPrompt {
    app: AppHandle,
}

impl DialogPrompt {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl PermissionPrompt for DialogPrompt {
    fn ask(&self, on_answer: Box<dyn FnOnce(bool) + Send + 'static>) {
        self.app
            .dialog()
            .message("WallApp needs storage access to save wallpapers to Downloads.")
            .title("Storage permission")
            .kind(MessageDialogKind::Info)
            .buttons(MessageDialogButtons::OkCancelCustom(
                "Allow".to_string(),
                "Deny".to_string(),
            ))
            .show(on_answer);
    }
}
