//! Screening of bridge download requests
//!
//! The injected script decides in-page whether a click or popup becomes a
//! bridge call. Any page script can call the command, so every request is
//! checked again here before it reaches the dispatcher.

use log::warn;

use crate::bridge::BridgeMessage;
use crate::config::BRIDGE_MIME_TYPE;
use crate::download::{fallback_file_name, sanitize_file_name, DownloadIntent, FilenameHint};
use crate::navigation::NavigationPolicy;

#[derive(Debug, Clone)]
pub struct InterceptPolicy {
    navigation: NavigationPolicy,
}

impl InterceptPolicy {
    pub fn new(navigation: NavigationPolicy) -> Self {
        Self { navigation }
    }

    /// Screen a message that arrived over the bridge.
    ///
    /// Untrusted hosts are dropped. Unusable filenames are replaced with the
    /// timestamped fallback.
    pub fn admit(&self, message: BridgeMessage, now_millis: i64) -> Option<DownloadIntent> {
        match message {
            BridgeMessage::DownloadImage { url, filename } => {
                if !self.navigation.is_trusted_asset(&url) {
                    warn!("Bridge: dropping download for untrusted url {}", url);
                    return None;
                }
                let filename =
                    sanitize_file_name(&filename).unwrap_or_else(|| fallback_file_name(now_millis));
                Some(DownloadIntent {
                    url,
                    hint: FilenameHint::Filename(filename),
                    mime_type: BRIDGE_MIME_TYPE.to_string(),
                })
            }
        }
    }
}
