mod bridge;
mod config;
mod connectivity;
mod download;
mod error;
mod host;
mod inject;
mod logging;
mod navigation;
mod session;
mod shell;
mod window;

use tauri::{Manager, WindowEvent};

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    logging::init();

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            window::launch(app.handle());
            Ok(())
        })
        .on_window_event(|window, event| {
            if let WindowEvent::Destroyed = event {
                if window.label() == config::MAIN_WINDOW_LABEL {
                    window::on_main_window_destroyed(window.app_handle());
                }
            }
        })
        .invoke_handler(tauri::generate_handler![
            bridge::commands::download_image,
            bridge::commands::navigate_back
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
