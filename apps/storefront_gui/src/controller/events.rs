//! UI/backend events and error modeling for the storefront GUI.

use client_core::{FlowEvent, StorefrontError};

pub enum UiEvent {
    Info(String),
    Error(UiError),
    Flow(FlowEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Validation,
    Transport,
    Backend,
    Unknown,
}

impl UiErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            UiErrorCategory::Validation => "Validasi",
            UiErrorCategory::Transport => "Koneksi",
            UiErrorCategory::Backend => "Server",
            UiErrorCategory::Unknown => "Error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    CreateOrder,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_storefront(context: UiErrorContext, err: &StorefrontError) -> Self {
        let category = if err.is_validation() {
            UiErrorCategory::Validation
        } else if err.is_network() {
            UiErrorCategory::Transport
        } else if err.backend_status().is_some() {
            UiErrorCategory::Backend
        } else {
            UiErrorCategory::Unknown
        };
        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    /// Classifies free-form worker and queue failures by keyword.
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("invalid")
            || message_lower.contains("required")
            || message_lower.contains("missing")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    /// Validation problems are shown inline; everything else gets the banner.
    pub fn wants_banner(&self) -> bool {
        self.category != UiErrorCategory::Validation
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
