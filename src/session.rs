//! The single embedded browser session

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use log::{debug, info};

use crate::config::BrowserSettings;

/// One document lifetime in the webview, from load start to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInstance(pub u64);

#[derive(Debug, Default)]
struct PageTracker {
    instance: u64,
    injected: bool,
    current_url: Option<String>,
}

/// Owns browser configuration and page lifecycle state for the process.
#[derive(Debug)]
pub struct BrowserSession {
    settings: BrowserSettings,
    user_agent: String,
    pages: Mutex<PageTracker>,
    torn_down: AtomicBool,
}

impl BrowserSession {
    pub fn new(settings: BrowserSettings) -> Self {
        let user_agent = settings.user_agent();
        Self {
            settings,
            user_agent,
            pages: Mutex::new(PageTracker::default()),
            torn_down: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &BrowserSettings {
        &self.settings
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn pages(&self) -> MutexGuard<'_, PageTracker> {
        self.pages.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// A load started: opens a new page instance.
    pub fn page_started(&self, url: &str) -> PageInstance {
        let mut pages = self.pages();
        pages.instance += 1;
        pages.injected = false;
        pages.current_url = Some(url.to_string());
        debug!("Session: page {} started {}", pages.instance, url);
        PageInstance(pages.instance)
    }

    /// A load finished. Returns the page instance the first time it finishes,
    /// `None` on repeats; that is the injection guard.
    pub fn page_finished(&self, url: &str) -> Option<PageInstance> {
        let mut pages = self.pages();
        if pages.current_url.is_none() {
            // Finished without a Started (initial document on some hosts).
            pages.instance += 1;
            pages.current_url = Some(url.to_string());
        }
        if pages.injected {
            debug!("Session: page {} already injected", pages.instance);
            return None;
        }
        pages.injected = true;
        Some(PageInstance(pages.instance))
    }

    /// Returns `true` only for the call that actually tore the session down.
    pub fn tear_down(&self) -> bool {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            debug!("Session: already torn down");
            return false;
        }
        let mut pages = self.pages();
        *pages = PageTracker::default();
        info!("Session: torn down");
        true
    }
}
