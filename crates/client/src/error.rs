use thiserror::Error;

/// Failure of a remote call, propagated to the caller unchanged
#[derive(Debug, Error)]
pub enum RemoteCallError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Cloudflare API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<i32>,
        message: String,
    },

    #[error("Failed to decode Cloudflare response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to build Cloudflare client: {0}")]
    Client(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl RemoteCallError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RemoteCallError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, RemoteCallError>;
