use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Netris API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected payload: {0}")]
    UnexpectedPayload(String),

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Invalid controller URL: {0}")]
    InvalidUrl(String),
}
