use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Validation,
    Conflict,
    Internal,
}

/// Error body returned by the storefront backend on non-2xx responses.
///
/// Only `message` is part of the contract; `code` is optional and set by the sandbox.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: Some(message.into()),
        }
    }

    /// The backend message, unless it is missing or blank.
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.message
            .as_deref()
            .filter(|message| !message.trim().is_empty())
            .unwrap_or(fallback)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("player id is required")]
    MissingPlayerId,
    #[error("zone must be at least 1")]
    InvalidZone,
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error("unknown package code {0}")]
    UnknownPackage(String),
}

impl From<DraftError> for ApiError {
    fn from(value: DraftError) -> Self {
        ApiError::new(ErrorCode::Validation, value.to_string())
    }
}
