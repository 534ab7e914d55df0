use thiserror::Error;

use crate::messages;

#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Validation(String),
    /// Transport failure or a body that could not be decoded.
    #[error("{0}")]
    Network(#[from] reqwest::Error),
    /// Non-2xx response; `message` comes from the body or a per-endpoint fallback.
    #[error("{message}")]
    Backend { status: u16, message: String },
    #[error("invalid backend url: {0}")]
    InvalidBackendUrl(#[from] url::ParseError),
}

impl StorefrontError {
    pub fn missing_player_id() -> Self {
        StorefrontError::Validation(messages::PLAYER_ID_REQUIRED.to_string())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, StorefrontError::Validation(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, StorefrontError::Network(_))
    }

    pub fn backend_status(&self) -> Option<u16> {
        match self {
            StorefrontError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T, E = StorefrontError> = std::result::Result<T, E>;
