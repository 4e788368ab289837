fn main() {
    // App commands reachable from the remote origin are gated by capabilities.
    let attributes = tauri_build::Attributes::new().app_manifest(
        tauri_build::AppManifest::new().commands(&["download_image", "navigate_back"]),
    );
    tauri_build::try_build(attributes).expect("failed to run tauri build script");
}
