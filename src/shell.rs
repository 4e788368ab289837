//! Browser controller: wires policy, session and dispatcher to host events
//!
//! Every method here runs on the UI thread. Bridge traffic reaches
//! [`Shell::on_bridge_message`] only through the bridge pump.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::bridge::BridgeMessage;
use crate::config::ShellConfig;
use crate::download::{
    mime_for_file_name, DispatchOutcome, DownloadDispatcher, DownloadIntent, FilenameHint,
};
use crate::host::{
    CookieSource, DownloadService, ExternalOpener, Notifier, PermissionGate, ToastLength,
};
use crate::inject::{InterceptPolicy, ScriptInjector};
use crate::navigation::{NavigationDecision, NavigationPolicy};
use crate::session::BrowserSession;

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Host collaborators the shell is built from.
pub struct ShellHost {
    pub downloads: Arc<dyn DownloadService>,
    pub cookies: Arc<dyn CookieSource>,
    pub permissions: Arc<dyn PermissionGate>,
    pub notifier: Arc<dyn Notifier>,
    pub opener: Arc<dyn ExternalOpener>,
}

pub struct Shell {
    config: ShellConfig,
    navigation: NavigationPolicy,
    intercept: InterceptPolicy,
    injector: ScriptInjector,
    session: BrowserSession,
    dispatcher: DownloadDispatcher,
    permissions: Arc<dyn PermissionGate>,
    notifier: Arc<dyn Notifier>,
    opener: Arc<dyn ExternalOpener>,
}

impl Shell {
    pub fn new(config: ShellConfig, host: ShellHost) -> Self {
        let navigation = NavigationPolicy::new(&config.app_url, &config.trusted_asset_host);
        let session = BrowserSession::new(config.browser.clone());
        let dispatcher = DownloadDispatcher::new(
            host.downloads,
            host.cookies,
            host.permissions.clone(),
            host.notifier.clone(),
            session.user_agent(),
        );
        Self {
            intercept: InterceptPolicy::new(navigation.clone()),
            injector: ScriptInjector::new(navigation.asset_host()),
            navigation,
            session,
            dispatcher,
            permissions: host.permissions,
            notifier: host.notifier,
            opener: host.opener,
            config,
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn session(&self) -> &BrowserSession {
        &self.session
    }

    /// Ask for storage permission up front when the host needs it.
    pub fn on_start(&self) {
        if self.permissions.requires_storage_permission()
            && !self.permissions.storage_permission_granted()
        {
            self.permissions.request_storage_permission();
        }
    }

    /// Navigation callback. Returns whether the webview may proceed.
    pub fn on_navigation(&self, url: &str) -> bool {
        let decision = self.navigation.decide(url);
        match decision {
            NavigationDecision::ContinueInView => debug!("Navigation: in-view {}", url),
            NavigationDecision::DelegateExternal => {
                info!("Navigation: external {}", url);
                if let Err(e) = self.opener.open(url) {
                    warn!("Navigation: {}", e);
                    self.notifier
                        .show(&format!("Cannot open link: {}", url), ToastLength::Short);
                }
            }
        }
        decision.allows_navigation()
    }

    pub fn on_page_started(&self, url: &str) {
        self.session.page_started(url);
    }

    /// Page load finished. Returns the script to evaluate, at most once per
    /// page instance.
    pub fn on_page_finished(&self, url: &str) -> Option<&str> {
        let page = self.session.page_finished(url)?;
        debug!("Inject: page {:?} {}", page, url);
        Some(self.injector.script())
    }

    /// Download started by the webview itself (no script involved).
    ///
    /// `content_disposition` is the response header when the host exposes
    /// it. Without it the name comes from the URL.
    pub fn on_native_download(&self, url: &str, content_disposition: Option<String>) -> DispatchOutcome {
        let mime_type = url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .and_then(mime_for_file_name)
            .unwrap_or(DEFAULT_MIME_TYPE);
        let hint = content_disposition
            .map(FilenameHint::ContentDisposition)
            .unwrap_or(FilenameHint::None);

        self.dispatcher.dispatch(DownloadIntent {
            url: url.to_string(),
            hint,
            mime_type: mime_type.to_string(),
        })
    }

    /// A message from page script, already on the UI thread.
    pub fn on_bridge_message(&self, message: BridgeMessage) -> Option<DispatchOutcome> {
        let intent = self.intercept.admit(message, now_millis())?;
        Some(self.dispatcher.dispatch(intent))
    }

    /// Outcome of a storage permission request. Nothing is retried.
    pub fn on_permission_result(&self, granted: bool) {
        if granted {
            self.notifier.show("Permission granted", ToastLength::Short);
        } else {
            info!("Permissions: write-storage denied");
        }
    }

    pub fn tear_down(&self) {
        self.session.tear_down();
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
