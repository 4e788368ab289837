//! Script injection after page loads

mod intercept;
mod script;

pub use intercept::InterceptPolicy;
pub use script::toast_script;

/// Holds the rendered interception script.
#[derive(Debug, Clone)]
pub struct ScriptInjector {
    script: String,
}

impl ScriptInjector {
    pub fn new(asset_host: &str) -> Self {
        Self {
            script: script::interceptor_script(asset_host),
        }
    }

    pub fn script(&self) -> &str {
        &self.script
    }
}
