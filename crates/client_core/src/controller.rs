//! Checkout flow controller: order creation, the pay step, and the poll task.
//!
//! Flow state is owned here and handed out as [`FlowSnapshot`]s. Every poll run gets a
//! generation number; cancelling or starting a new run bumps it, aborts the old task, and
//! any late update from an older generation is dropped.

use std::sync::{Arc, Mutex, MutexGuard};

use shared::domain::{Order, OrderDraft, OrderId};
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, info};

use crate::{
    backend::StorefrontBackend,
    error::Result,
    form, messages,
    poller::{OrderStatusPoller, PollConfig, PollOutcome, PollUpdate},
};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub enum FlowEvent {
    LoadingChanged(bool),
    OrderCreated(Order),
    StatusMessage(String),
    PaymentOpened { pay_url: String },
    PollProgress { order_id: OrderId, attempt: u32 },
    PollFinished { order_id: OrderId, outcome: PollOutcome },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowSnapshot {
    pub order: Option<Order>,
    pub message: String,
    pub loading: bool,
    pub polling: bool,
}

#[derive(Default)]
struct FlowState {
    order: Option<Order>,
    message: String,
    loading: bool,
    generation: u64,
    poll_task: Option<JoinHandle<()>>,
}

pub struct OrderFlowController {
    backend: Arc<dyn StorefrontBackend>,
    poll_config: PollConfig,
    inner: Mutex<FlowState>,
    events: broadcast::Sender<FlowEvent>,
}

impl OrderFlowController {
    pub fn new(backend: Arc<dyn StorefrontBackend>, poll_config: PollConfig) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            backend,
            poll_config,
            inner: Mutex::new(FlowState::default()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<FlowEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        let state = self.state();
        FlowSnapshot {
            order: state.order.clone(),
            message: state.message.clone(),
            loading: state.loading,
            polling: state.poll_task.is_some(),
        }
    }

    pub async fn create_order(&self, draft: &OrderDraft) -> Result<Order> {
        self.set_message(String::new());
        if let Err(err) = form::validate_draft(draft) {
            self.set_message(err.to_string());
            return Err(err);
        }

        self.set_loading(true);
        let result = form::submit(self.backend.as_ref(), draft).await;
        self.set_loading(false);

        match result {
            Ok(order) => {
                {
                    let mut state = self.state();
                    Self::cancel_locked(&mut state);
                    state.order = Some(order.clone());
                }
                self.emit(FlowEvent::OrderCreated(order.clone()));
                self.set_message(messages::ORDER_CREATED.to_string());
                Ok(order)
            }
            Err(err) => {
                self.set_message(err.to_string());
                Err(err)
            }
        }
    }

    /// Returns the payment URL the view should open, and starts polling the order.
    pub fn pay_now(self: &Arc<Self>) -> Option<String> {
        let order = self.state().order.clone();
        let Some(order) = order else {
            self.set_message(messages::ORDER_REQUIRED.to_string());
            return None;
        };
        let Some(pay_url) = order.pay_url.clone() else {
            self.set_message(messages::MISSING_PAY_URL.to_string());
            return None;
        };

        info!(order_id = %order.order_id, "payment page opened");
        self.emit(FlowEvent::PaymentOpened {
            pay_url: pay_url.clone(),
        });
        self.set_message(messages::PAYMENT_OPENED.to_string());
        self.watch_order(order.order_id);
        Some(pay_url)
    }

    /// Polls `order_id` in a background task, replacing any run already in flight.
    pub fn watch_order(self: &Arc<Self>, order_id: OrderId) {
        let mut state = self.state();
        Self::cancel_locked(&mut state);
        let generation = state.generation;

        let controller = Arc::clone(self);
        let poller = OrderStatusPoller::new(Arc::clone(&self.backend), self.poll_config);
        state.poll_task = Some(tokio::spawn(async move {
            let outcome = poller
                .run(&order_id, |update| {
                    controller.apply_poll_update(generation, &order_id, update)
                })
                .await;
            controller.finish_poll(generation, order_id, outcome);
        }));
        debug!(generation, "poll run started");
    }

    pub fn cancel_polling(&self) {
        let mut state = self.state();
        Self::cancel_locked(&mut state);
    }

    /// Stops background work. The poll task holds a handle to the controller, so
    /// dropping the last outside reference alone does not stop it.
    pub fn shutdown(&self) {
        self.cancel_polling();
        debug!("order flow controller shut down");
    }

    fn cancel_locked(state: &mut FlowState) {
        state.generation += 1;
        if let Some(task) = state.poll_task.take() {
            task.abort();
            debug!(generation = state.generation, "previous poll run aborted");
        }
    }

    fn apply_poll_update(&self, generation: u64, order_id: &OrderId, update: PollUpdate) {
        let mut state = self.state();
        if state.generation != generation {
            debug!(generation, current = state.generation, "dropping stale poll update");
            return;
        }
        match update {
            PollUpdate::Polling { attempt } => {
                drop(state);
                self.emit(FlowEvent::PollProgress {
                    order_id: order_id.clone(),
                    attempt,
                });
            }
            PollUpdate::Message(message) => {
                state.message = message.clone();
                drop(state);
                self.emit(FlowEvent::StatusMessage(message));
            }
        }
    }

    fn finish_poll(&self, generation: u64, order_id: OrderId, outcome: PollOutcome) {
        let mut state = self.state();
        if state.generation != generation {
            return;
        }
        state.poll_task = None;
        drop(state);
        info!(%order_id, ?outcome, "poll run finished");
        self.emit(FlowEvent::PollFinished { order_id, outcome });
    }

    fn set_message(&self, message: String) {
        self.state().message = message.clone();
        self.emit(FlowEvent::StatusMessage(message));
    }

    fn set_loading(&self, loading: bool) {
        self.state().loading = loading;
        self.emit(FlowEvent::LoadingChanged(loading));
    }

    fn emit(&self, event: FlowEvent) {
        let _ = self.events.send(event);
    }

    fn state(&self) -> MutexGuard<'_, FlowState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
