use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentFetchError {
    #[error("missing configuration value {0}")]
    ConfigurationMissing(&'static str),
    #[error("content provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("content provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("content provider response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid content provider url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
