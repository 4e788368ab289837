use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info};

use super::{PermissionGate, PermissionPrompt};

pub type PermissionResultCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// Storage permission as seen by this host.
///
/// Only Android asks before writing into the public Downloads directory. The
/// answer comes back asynchronously from the prompt and is handed to
/// `on_result`.
pub struct HostPermissions {
    required: bool,
    granted: Arc<AtomicBool>,
    asking: Arc<AtomicBool>,
    prompt: Arc<dyn PermissionPrompt>,
    on_result: PermissionResultCallback,
}

impl HostPermissions {
    pub fn new(
        required: bool,
        prompt: Arc<dyn PermissionPrompt>,
        on_result: PermissionResultCallback,
    ) -> Self {
        Self {
            required,
            granted: Arc::new(AtomicBool::new(!required)),
            asking: Arc::new(AtomicBool::new(false)),
            prompt,
            on_result,
        }
    }

    pub fn required_on_current_platform() -> bool {
        cfg!(target_os = "android")
    }
}

impl PermissionGate for HostPermissions {
    fn requires_storage_permission(&self) -> bool {
        self.required
    }

    fn storage_permission_granted(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    fn request_storage_permission(&self) {
        if self.asking.swap(true, Ordering::SeqCst) {
            debug!("Permissions: request already showing");
            return;
        }
        info!("Permissions: write-storage requested");

        let granted = self.granted.clone();
        let asking = self.asking.clone();
        let on_result = self.on_result.clone();
        self.prompt.ask(Box::new(move |answer| {
            granted.store(answer, Ordering::SeqCst);
            asking.store(false, Ordering::SeqCst);
            on_result(answer);
        }));
    }
}
