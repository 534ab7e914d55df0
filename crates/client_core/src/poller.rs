//! Order status polling after the shopper has been sent to the payment page.
//!
//! Each poll inspects the backend status:
//! `paid` triggers the topup once and stops, `delivered` and `failed` stop, and anything
//! else waits [`PollConfig::interval`] and polls again until more than
//! [`PollConfig::max_attempts`] retries have been spent. A transport error, or a reply
//! whose body is not a status response, ends the run without a retry.

use std::{sync::Arc, time::Duration};

use shared::{
    domain::{OrderId, OrderStatus},
    protocol::OrderStatusResponse,
};
use tracing::{debug, info, warn};

use crate::{
    backend::StorefrontBackend,
    messages,
    topup::{TopupOutcome, TopupTrigger},
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep {
    TriggerTopup,
    Delivered,
    Failed(Option<String>),
    Wait,
}

pub fn next_step(response: &OrderStatusResponse) -> PollStep {
    match response.status {
        Some(OrderStatus::Paid) => PollStep::TriggerTopup,
        Some(OrderStatus::Delivered) => PollStep::Delivered,
        Some(OrderStatus::Failed) => PollStep::Failed(
            response
                .detail
                .clone()
                .filter(|detail| !detail.is_empty()),
        ),
        Some(OrderStatus::Pending) | Some(OrderStatus::Unknown) | None => PollStep::Wait,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Delivered,
    Failed { detail: Option<String> },
    /// Still pending once the attempt budget ran out. Not an error.
    Exhausted { polls: u32 },
    Topup(TopupOutcome),
    Errored(String),
}

impl PollOutcome {
    pub fn message(&self) -> String {
        match self {
            PollOutcome::Delivered => messages::DELIVERED.to_string(),
            PollOutcome::Failed { detail } => messages::transaction_failed(detail.as_deref()),
            PollOutcome::Exhausted { .. } => messages::STILL_PENDING.to_string(),
            PollOutcome::Topup(outcome) => outcome.message(),
            PollOutcome::Errored(reason) => messages::status_check_failed(reason),
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(
            self,
            PollOutcome::Delivered | PollOutcome::Topup(TopupOutcome::Delivered)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollUpdate {
    Polling { attempt: u32 },
    Message(String),
}

pub struct OrderStatusPoller {
    backend: Arc<dyn StorefrontBackend>,
    topup: TopupTrigger,
    config: PollConfig,
}

impl OrderStatusPoller {
    pub fn new(backend: Arc<dyn StorefrontBackend>, config: PollConfig) -> Self {
        Self {
            topup: TopupTrigger::new(Arc::clone(&backend)),
            backend,
            config,
        }
    }

    pub async fn run<F>(&self, order_id: &OrderId, mut on_update: F) -> PollOutcome
    where
        F: FnMut(PollUpdate) + Send,
    {
        let mut attempt = 0u32;
        let outcome = loop {
            if attempt > self.config.max_attempts {
                info!(%order_id, polls = attempt, "order still pending after poll budget");
                break PollOutcome::Exhausted { polls: attempt };
            }

            on_update(PollUpdate::Polling { attempt });
            let response = match self.backend.order_status(order_id).await {
                Ok(response) => response,
                Err(err) => {
                    warn!(%order_id, attempt, error = %err, "order status check failed");
                    break PollOutcome::Errored(err.to_string());
                }
            };
            debug!(%order_id, attempt, status = ?response.status, "polled order status");

            match next_step(&response) {
                PollStep::TriggerTopup => {
                    on_update(PollUpdate::Message(messages::PAYMENT_RECEIVED.to_string()));
                    break PollOutcome::Topup(self.topup.trigger(order_id).await);
                }
                PollStep::Delivered => break PollOutcome::Delivered,
                PollStep::Failed(detail) => {
                    info!(%order_id, ?detail, "order failed");
                    break PollOutcome::Failed { detail };
                }
                PollStep::Wait => {
                    attempt += 1;
                    tokio::time::sleep(self.config.interval).await;
                }
            }
        };

        on_update(PollUpdate::Message(outcome.message()));
        outcome
    }
}

#[cfg(test)]
#[path = "tests/poller_tests.rs"]
mod tests;
