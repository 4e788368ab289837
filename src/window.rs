//! Shell launch and webview window construction

use std::sync::Arc;

use log::{debug, error, info, warn};
use tauri::webview::{DownloadEvent, PageLoadEvent};
use tauri::{AppHandle, Emitter, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder};
use tauri_plugin_dialog::{DialogExt, MessageDialogButtons, MessageDialogKind};

use crate::bridge::{self, BridgeSender};
use crate::config::{ShellConfig, MAIN_WINDOW_LABEL, WINDOW_TITLE};
use crate::connectivity::{ConnectivityGate, OsProbe};
use crate::download::{DownloadFinished, TransferService};
use crate::error::{ShellError, ShellResult};
use crate::host::{
    DialogPrompt, HostPermissions, Notifier, TauriCookies, TauriMainThread, TauriNotifier, TauriOpener,
    ToastLength,
};
use crate::shell::{Shell, ShellHost};

/// Gate on connectivity, then bring up the shell. Re-entered from the
/// "Retry" button of the offline dialog.
pub fn launch(app: &AppHandle) {
    if let Err(e) = ConnectivityGate::default().admit(&OsProbe) {
        info!("Shell: {}", e);
        show_no_internet_dialog(app);
        return;
    }

    if let Err(e) = start_shell(app) {
        error!("Shell: startup failed: {}", e);
        app.exit(1);
    }
}

fn show_no_internet_dialog(app: &AppHandle) {
    let handle = app.clone();
    app.dialog()
        .message("Check your connection and try again.")
        .title("No Internet")
        .kind(MessageDialogKind::Warning)
        .buttons(MessageDialogButtons::OkCancelCustom(
            "Retry".to_string(),
            "Exit".to_string(),
        ))
        .show(move |retry| {
            if retry {
                info!("Connectivity: retry requested");
                launch(&handle);
            } else {
                info!("Connectivity: exit requested");
                handle.exit(0);
            }
        });
}

fn start_shell(app: &AppHandle) -> ShellResult<()> {
    if app.get_webview_window(MAIN_WINDOW_LABEL).is_some() {
        return Ok(());
    }

    let notifier: Arc<dyn Notifier> = Arc::new(TauriNotifier::new(app.clone()));
    let downloads_dir = app.path().download_dir()?;
    let downloads = TransferService::new(downloads_dir, finished_callback(app, notifier.clone()));

    let shell = Arc::new(Shell::new(
        ShellConfig::default(),
        ShellHost {
            downloads: Arc::new(downloads),
            cookies: Arc::new(TauriCookies::new(app.clone())),
            permissions: Arc::new(HostPermissions::new(
                HostPermissions::required_on_current_platform(),
                Arc::new(DialogPrompt::new(app.clone())),
                permission_callback(app),
            )),
            notifier,
            opener: Arc::new(TauriOpener::new(app.clone())),
        },
    ));

    let (sender, receiver) = bridge::bridge_channel();
    app.manage(sender);
    app.manage(shell.clone());

    let pump_shell = shell.clone();
    tauri::async_runtime::spawn(bridge::pump(
        receiver,
        TauriMainThread::new(app.clone()),
        move |message| {
            pump_shell.on_bridge_message(message);
        },
    ));

    build_main_window(app, shell.clone())?;
    shell.on_start();
    Ok(())
}

fn finished_callback(
    app: &AppHandle,
    notifier: Arc<dyn Notifier>,
) -> Arc<dyn Fn(DownloadFinished) + Send + Sync> {
    let app = app.clone();
    Arc::new(move |event: DownloadFinished| {
        if event.success {
            notifier.show(
                &format!("Download complete: {}", event.file_name),
                ToastLength::Short,
            );
        } else {
            let detail = event.error.as_deref().unwrap_or("unknown error");
            notifier.show(&format!("Download failed: {}", detail), ToastLength::Long);
        }
        let _ = app.emit("download-finished", event);
    })
}

fn permission_callback(app: &AppHandle) -> Arc<dyn Fn(bool) + Send + Sync> {
    let app = app.clone();
    Arc::new(move |granted| {
        if let Some(shell) = app.try_state::<Arc<Shell>>() {
            shell.on_permission_result(granted);
        }
    })
}

fn build_main_window(app: &AppHandle, shell: Arc<Shell>) -> ShellResult<WebviewWindow> {
    let config = shell.config();
    let url: url::Url = config
        .app_url
        .parse()
        .map_err(|e| ShellError::InvalidUrl(format!("{}: {}", config.app_url, e)))?;
    let settings = shell.session().settings().clone();
    info!("Shell: browser settings {:?}", settings);

    let nav_shell = shell.clone();
    let load_shell = shell.clone();
    let download_shell = shell.clone();
    let download_app = app.clone();

    let mut builder = WebviewWindowBuilder::new(app, MAIN_WINDOW_LABEL, WebviewUrl::External(url))
        .user_agent(shell.session().user_agent())
        .zoom_hotkeys_enabled(settings.zoom_controls)
        .incognito(!settings.dom_storage_enabled)
        .on_navigation(move |url| nav_shell.on_navigation(url.as_str()))
        .on_page_load(move |window, payload| match payload.event() {
            PageLoadEvent::Started => {
                load_shell.on_page_started(payload.url().as_str());
                set_loading_title(&window, true);
            }
            PageLoadEvent::Finished => {
                set_loading_title(&window, false);
                if let Some(script) = load_shell.on_page_finished(payload.url().as_str()) {
                    if let Err(e) = window.eval(script) {
                        warn!("Inject: eval failed: {}", e);
                    }
                }
            }
        })
        .on_download(move |_webview, event| match event {
            DownloadEvent::Requested { url, .. } => {
                let shell = download_shell.clone();
                let url = url.to_string();
                // Tauri's download event carries no response headers
                if let Err(e) = download_app.run_on_main_thread(move || {
                    shell.on_native_download(&url, None);
                }) {
                    error!("Download: cannot reach the UI thread: {}", e);
                }
                // the shell's download service owns the transfer
                false
            }
            _ => true,
        });

    #[cfg(desktop)]
    {
        builder = builder.title(WINDOW_TITLE).inner_size(420.0, 860.0);
    }

    #[cfg(target_os = "windows")]
    {
        builder = builder.additional_browser_args(&settings.webview2_args());
    }
    #[cfg(not(target_os = "windows"))]
    if settings.allow_mixed_content {
        debug!("Shell: mixed content follows the platform webview policy");
    }

    let window = builder.build()?;
    info!("Shell: main window loading {}", shell.config().app_url);
    Ok(window)
}

#[cfg(desktop)]
fn set_loading_title(window: &WebviewWindow, loading: bool) {
    let title = if loading {
        format!("{} - Loading...", WINDOW_TITLE)
    } else {
        WINDOW_TITLE.to_string()
    };
    let _ = window.set_title(&title);
}

#[cfg(mobile)]
fn set_loading_title(_window: &WebviewWindow, _loading: bool) {}

/// Back gesture with no page history left: fall through to the default
/// shell-close behaviour. The page pops its own history while it has any.
pub fn close_on_exhausted_history(app: &AppHandle) {
    info!("Back: history exhausted, closing");
    #[cfg(desktop)]
    if let Some(window) = app.get_webview_window(MAIN_WINDOW_LABEL) {
        if let Err(e) = window.close() {
            warn!("Back: close failed: {}", e);
        }
    }
    #[cfg(mobile)]
    app.exit(0);
}

/// Window destroyed: tear the session down once.
pub fn on_main_window_destroyed(app: &AppHandle) {
    if let Some(shell) = app.try_state::<Arc<Shell>>() {
        shell.tear_down();
    }
}

/// Bridge sender for command handlers.
pub fn bridge_sender(app: &AppHandle) -> Option<BridgeSender> {
    app.try_state::<BridgeSender>().map(|s| s.inner().clone())
}
