//! Script-to-native bridge
//!
//! Page script calls the async `download_image` command. The command never
//! touches UI state: it queues a typed [`BridgeMessage`], and [`pump`] moves
//! each message onto the UI thread where the shell handles it.
//!
//! Architecture: script → command (async runtime) → channel → pump → UI thread

mod channel;
pub mod commands;

pub use channel::{bridge_channel, pump, BridgeMessage, BridgeReceiver, BridgeSender};
