//! Native file downloads
//!
//! - `dispatcher`: permission check, request construction, submission
//! - `filename`: best-effort filename guessing
//! - `worker`: the desktop download service, streaming transfers with reqwest

mod dispatcher;
mod filename;
mod types;
mod worker;

pub use dispatcher::{DispatchOutcome, DownloadDispatcher};
pub use filename::{fallback_file_name, mime_for_file_name, sanitize_file_name};
pub use types::{
    DownloadFinished, DownloadId, DownloadIntent, FilenameHint, PersistedDownload,
};
pub use worker::TransferService;

#[cfg(test)]
pub(crate) use dispatcher::tests as fakes;
