use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid HTTP method: {0}. Supported: GET, POST, PUT, DELETE, PATCH, HEAD, OPTIONS, CONNECT, TRACE")]
    InvalidMethod(String),

    #[error("No parameters specified. Use --params to specify parameters")]
    NoParameters,

    #[error("Cannot use both --payload and --payload-file together")]
    ConflictingPayloadSources,

    #[error("Only .txt payload files are supported: {}", .0.display())]
    UnsupportedPayloadFile(PathBuf),

    #[error("Failed to read payload file {}: {source}", path.display())]
    PayloadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Payload file is empty: {}", .0.display())]
    EmptyPayloadFile(PathBuf),
}

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("failed to build request: {0}")]
    Build(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request failed after {retries} retries: {last}")]
    RetriesExhausted {
        retries: u32,
        last: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read response body: {0}")]
    Body(String),
}

impl RequestError {
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            RequestError::Transport(_) | RequestError::RetriesExhausted { .. }
        )
    }
}

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}\n\nPlease ensure Chromium or Chrome is installed (e.g. `apt install chromium`) or pass --chrome-path")]
    Launch(String),

    #[error("browser not started")]
    NotStarted,

    #[error("failed to load page: {0}")]
    Navigation(String),

    #[error("script execution failed: {0}")]
    Script(String),

    #[error("failed to handle dialog: {0}")]
    Dialog(String),

    #[error("browser connection lost: {0}")]
    Disconnected(String),
}

impl BrowserError {
    /// The DevTools connection is gone and the session cannot be reused.
    pub fn is_disconnected(&self) -> bool {
        matches!(self, BrowserError::Disconnected(_))
    }
}
