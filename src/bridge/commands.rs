//! Commands exposed to page script

use log::{debug, error};
use tauri::AppHandle;

use super::BridgeMessage;
use crate::window;

/// `downloadImage(url, filename)` from page script.
///
/// Only queues the request. Nothing is reported back to script; failures
/// surface natively.
#[tauri::command]
pub async fn download_image(app: AppHandle, url: String, filename: String) {
    debug!("Bridge: download_image {} as {}", url, filename);
    let Some(sender) = window::bridge_sender(&app) else {
        error!("Bridge: shell is not running, dropping {}", url);
        return;
    };
    if let Err(e) = sender.send(BridgeMessage::DownloadImage { url, filename }) {
        error!("Bridge: {}", e);
    }
}

/// Back gesture the page could not satisfy from its own history.
#[tauri::command]
pub async fn navigate_back(app: AppHandle) {
    let handle = app.clone();
    if let Err(e) = app.run_on_main_thread(move || window::close_on_exhausted_history(&handle)) {
        error!("Back: cannot reach the UI thread: {}", e);
    }
}
