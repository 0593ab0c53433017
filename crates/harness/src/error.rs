//! Error types for the harness

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the harness [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Harness error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config encode error: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("No report shards matching '{pattern}' in {dir}")]
    NoShards { dir: PathBuf, pattern: String },

    #[error("Malformed report shard {path}: {reason}")]
    MalformedShard { path: PathBuf, reason: String },

    #[error("Hook '{hook}' failed in service '{service}': {source}")]
    Hook {
        hook: &'static str,
        service: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Screenshot capture failed: {0}")]
    Screenshot(#[from] ScreenshotError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Spec root not found: {0}")]
    SpecRootNotFound(PathBuf),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised by the active browser session facade
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("WebDriver command failed: {0}")]
    Command(String),

    #[error("Session is gone: {0}")]
    Gone(String),
}

/// Errors raised while capturing a failure screenshot.
///
/// Capture is a best-effort side channel: callers are expected to log these
/// and carry on, never to fail the surrounding hook.
#[derive(Error, Debug)]
pub enum ScreenshotError {
    #[error("session refused capture: {0}")]
    Session(#[from] SessionError),

    #[error("session returned an empty capture")]
    EmptyCapture,

    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
