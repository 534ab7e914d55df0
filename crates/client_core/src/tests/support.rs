use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use shared::{
    domain::{Order, OrderId, OrderStatus},
    protocol::{CreateOrderRequest, OrderStatusResponse, TriggerTopupResponse},
};

use crate::{
    backend::StorefrontBackend,
    error::{Result, StorefrontError},
};

#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Backend(u16, String),
}

impl<T> Reply<T> {
    fn into_result(self) -> Result<T> {
        match self {
            Reply::Ok(value) => Ok(value),
            Reply::Backend(status, message) => Err(StorefrontError::Backend { status, message }),
        }
    }
}

pub fn status(status: OrderStatus) -> Reply<OrderStatusResponse> {
    Reply::Ok(OrderStatusResponse {
        status: Some(status),
        detail: None,
    })
}

/// Backend double that replays scripted replies and counts calls.
///
/// Once the status script is exhausted every further poll answers `pending`.
pub struct ScriptedBackend {
    create_reply: Reply<Order>,
    statuses: Mutex<VecDeque<Reply<OrderStatusResponse>>>,
    topup_reply: Reply<TriggerTopupResponse>,
    pub create_requests: Mutex<Vec<CreateOrderRequest>>,
    pub status_calls: AtomicUsize,
    pub topup_calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            create_reply: Reply::Ok(Order {
                order_id: OrderId::from("ORD-1"),
                pay_url: Some("https://pay.test/ORD-1".to_string()),
            }),
            statuses: Mutex::new(VecDeque::new()),
            topup_reply: Reply::Ok(TriggerTopupResponse {
                status: Some("delivered".to_string()),
            }),
            create_requests: Mutex::new(Vec::new()),
            status_calls: AtomicUsize::new(0),
            topup_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_create_reply(mut self, reply: Reply<Order>) -> Self {
        self.create_reply = reply;
        self
    }

    pub fn with_statuses(
        self,
        statuses: impl IntoIterator<Item = Reply<OrderStatusResponse>>,
    ) -> Self {
        self.statuses.lock().expect("statuses lock").extend(statuses);
        self
    }

    pub fn with_topup_reply(mut self, reply: Reply<TriggerTopupResponse>) -> Self {
        self.topup_reply = reply;
        self
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn topup_calls(&self) -> usize {
        self.topup_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_requests.lock().expect("requests lock").len()
    }
}

#[async_trait]
impl StorefrontBackend for ScriptedBackend {
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order> {
        self.create_requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        self.create_reply.clone().into_result()
    }

    async fn order_status(&self, _order_id: &OrderId) -> Result<OrderStatusResponse> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.statuses.lock().expect("statuses lock").pop_front();
        next.unwrap_or_else(|| status(OrderStatus::Pending)).into_result()
    }

    async fn trigger_topup(&self, _order_id: &OrderId) -> Result<TriggerTopupResponse> {
        self.topup_calls.fetch_add(1, Ordering::SeqCst);
        self.topup_reply.clone().into_result()
    }
}
