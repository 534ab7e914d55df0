use std::sync::Arc;

use shared::domain::OrderId;
use tracing::{info, warn};

use crate::{backend::StorefrontBackend, messages};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopupOutcome {
    Delivered,
    /// Accepted but not yet delivered; carries the status the backend echoed, if any.
    Processing(Option<String>),
    Failed(String),
}

impl TopupOutcome {
    pub fn message(&self) -> String {
        match self {
            TopupOutcome::Delivered => messages::TOPUP_DELIVERED.to_string(),
            TopupOutcome::Processing(status) => messages::topup_processing(
                status.as_deref().filter(|status| !status.is_empty()),
            ),
            TopupOutcome::Failed(reason) => messages::topup_error(reason),
        }
    }
}

/// One-shot fulfillment request for a paid order. Never retries.
pub struct TopupTrigger {
    backend: Arc<dyn StorefrontBackend>,
}

impl TopupTrigger {
    pub fn new(backend: Arc<dyn StorefrontBackend>) -> Self {
        Self { backend }
    }

    pub async fn trigger(&self, order_id: &OrderId) -> TopupOutcome {
        match self.backend.trigger_topup(order_id).await {
            Ok(response) if response.is_delivered() => {
                info!(%order_id, "topup delivered");
                TopupOutcome::Delivered
            }
            Ok(response) => {
                info!(%order_id, status = ?response.status, "topup accepted");
                TopupOutcome::Processing(response.status)
            }
            Err(err) => {
                warn!(%order_id, error = %err, "topup request failed");
                TopupOutcome::Failed(err.to_string())
            }
        }
    }
}
