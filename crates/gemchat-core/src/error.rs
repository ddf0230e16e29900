use reqwest::StatusCode;
use thiserror::Error;

/// Failures of a single generate call. All of them surface to the user as the
/// same fallback answer; the variants exist for the log.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("request to generative endpoint failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("generative endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("could not decode response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("request task did not complete: {0}")]
    Interrupted(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no endpoint configured; set GEMINI_ENDPOINT or add \"endpoint\" to the config file")]
    MissingEndpoint,
    #[error("endpoint is not a valid URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("malformed config file: {0}")]
    Parse(#[from] serde_json::Error),
}
