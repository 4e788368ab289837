use thiserror::Error;

/// Failures the shell can hit. All of them are handled where they occur; none
/// is allowed to take the process down.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("no usable network connection")]
    NoConnectivity,

    #[error("invalid download url: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Submission(String),

    #[error("transfer failed: {0}")]
    Transfer(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("host error: {0}")]
    Tauri(#[from] tauri::Error),

    #[error("bridge channel closed")]
    BridgeClosed,
}

pub type ShellResult<T> = Result<T, ShellError>;
