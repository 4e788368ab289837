//! Per-request routing between the embedded webview and the external opener

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Load inside the embedded browser.
    ContinueInView,
    /// Hand to the host's external URL opener and cancel the in-view navigation.
    DelegateExternal,
}

impl NavigationDecision {
    /// Value expected by the webview navigation callback.
    pub fn allows_navigation(self) -> bool {
        matches!(self, NavigationDecision::ContinueInView)
    }
}

#[derive(Debug, Clone)]
pub struct NavigationPolicy {
    app_root: String,
    asset_host: String,
}

impl NavigationPolicy {
    pub fn new(app_root: impl Into<String>, asset_host: impl Into<String>) -> Self {
        Self {
            app_root: app_root.into(),
            asset_host: asset_host.into().to_ascii_lowercase(),
        }
    }

    pub fn asset_host(&self) -> &str {
        &self.asset_host
    }

    /// Classify a requested URL.
    ///
    /// Anything that does not parse as an absolute URL is delegated: the
    /// webview cannot render it, the external opener may.
    pub fn decide(&self, url: &str) -> NavigationDecision {
        if url.starts_with(&self.app_root) {
            return NavigationDecision::ContinueInView;
        }
        if self.is_trusted_asset(url) {
            return NavigationDecision::ContinueInView;
        }
        NavigationDecision::DelegateExternal
    }

    /// Whether `url` points at the trusted asset host or one of its subdomains.
    pub fn is_trusted_asset(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        if !matches!(parsed.scheme(), "http" | "https") {
            return false;
        }
        parsed
            .host_str()
            .map(|host| host_matches(host, &self.asset_host))
            .unwrap_or(false)
    }
}

fn host_matches(host: &str, expected: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == expected
        || host
            .strip_suffix(expected)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
