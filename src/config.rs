//! Compile-time shell configuration
//!
//! The load target and the trusted asset host are fixed at build time. Every
//! browser trust decision lives in [`BrowserSettings`] so it can be read in one
//! place instead of being buried in webview setup.

/// Root of the remote application. Navigations under this prefix stay in-view.
pub const APP_URL: &str = "https://debwallapp.pages.dev/";

/// Image host whose resources are treated as in-app downloadable content.
pub const TRUSTED_ASSET_HOST: &str = "res.cloudinary.com";

/// Token appended to the platform user agent.
pub const USER_AGENT_SUFFIX: &str = "WallApp/1.0";

/// Label of the single webview window.
pub const MAIN_WINDOW_LABEL: &str = "main";

pub const WINDOW_TITLE: &str = "WallApp";

/// Prefix for filenames synthesized when the page gives none.
pub const FALLBACK_FILENAME_PREFIX: &str = "wallpaper_";
pub const FALLBACK_FILENAME_EXTENSION: &str = ".jpg";

/// MIME type assumed for bridge downloads.
pub const BRIDGE_MIME_TYPE: &str = "image/jpeg";

/// Configuration flags handed to the host browser component.
///
/// Script execution, cookie acceptance, the HTTP cache and viewport handling
/// are not switchable through Tauri and stay at the platform webview's
/// defaults, which are all "on".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserSettings {
    /// `false` runs the webview without persistent storage.
    pub dom_storage_enabled: bool,
    pub zoom_controls: bool,
    /// Lets https pages of the remote app pull http sub-resources. This is a
    /// broad trust decision, kept because the gallery embeds third-party
    /// thumbnails that are not always served over TLS.
    pub allow_mixed_content: bool,
    pub user_agent_suffix: &'static str,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            dom_storage_enabled: true,
            zoom_controls: false,
            allow_mixed_content: true,
            user_agent_suffix: USER_AGENT_SUFFIX,
        }
    }
}

impl BrowserSettings {
    /// Platform default user agent with the shell's suffix token.
    pub fn user_agent(&self) -> String {
        format!("{} {}", platform_user_agent(), self.user_agent_suffix)
    }

    /// Extra Chromium switches for WebView2.
    #[cfg(any(target_os = "windows", test))]
    pub fn webview2_args(&self) -> String {
        let mut args = vec!["--disable-features=msWebOOUI,msPdfOOUI,msSmartScreenProtection"];
        if self.allow_mixed_content {
            args.push("--allow-running-insecure-content");
        }
        args.join(" ")
    }
}

/// The user agent the platform webview reports on its own.
pub fn platform_user_agent() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/144.0.0.0 Safari/537.36 Edg/144.0.0.0"
    }
    #[cfg(target_os = "macos")]
    {
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko)"
    }
    #[cfg(target_os = "android")]
    {
        "Mozilla/5.0 (Linux; Android 14; wv) AppleWebKit/537.36 (KHTML, like Gecko) Version/4.0 Chrome/144.0.0.0 Mobile Safari/537.36"
    }
    #[cfg(target_os = "ios")]
    {
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148"
    }
    #[cfg(not(any(
        target_os = "windows",
        target_os = "macos",
        target_os = "android",
        target_os = "ios"
    )))]
    {
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/605.1.15 (KHTML, like Gecko)"
    }
}

/// Runtime view of the compile-time configuration.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub app_url: String,
    pub trusted_asset_host: String,
    pub browser: BrowserSettings,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            app_url: APP_URL.to_string(),
            trusted_asset_host: TRUSTED_ASSET_HOST.to_string(),
            browser: BrowserSettings::default(),
        }
    }
}
