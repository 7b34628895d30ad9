use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScreenerError {
    #[error("malformed tick: field '{field}': {reason}")]
    MalformedTick { field: &'static str, reason: String },

    #[error("OKX API error (code {code}): {msg}")]
    OkxApi { code: String, msg: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(String),
}
