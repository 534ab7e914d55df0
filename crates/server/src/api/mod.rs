//! In-memory sandbox order book behind the storefront HTTP contract.
//!
//! Payment is simulated: the pay URL marks an order paid, or `auto_pay_after_polls`
//! flips it once the storefront has polled enough times. Orders live only as long as
//! the process.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use shared::{
    domain::{Order, OrderId, OrderStatus},
    error::{ApiError, ErrorCode},
    protocol::{CreateOrderRequest, OrderStatusResponse, TriggerTopupResponse},
};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SandboxOrder {
    pub order_id: OrderId,
    pub request: CreateOrderRequest,
    pub total: String,
    pub status: OrderStatus,
    pub detail: Option<String>,
    pub polls: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ApiContext {
    orders: Arc<Mutex<HashMap<OrderId, SandboxOrder>>>,
    pub public_url: String,
    pub auto_pay_after_polls: Option<u32>,
}

pub fn sandbox_pay_route() -> &'static str {
    "/sandbox/pay"
}

pub fn sandbox_fail_route() -> &'static str {
    "/sandbox/fail"
}

impl ApiContext {
    pub fn new(public_url: impl Into<String>, auto_pay_after_polls: Option<u32>) -> Self {
        Self {
            orders: Arc::new(Mutex::new(HashMap::new())),
            public_url: public_url.into().trim_end_matches('/').to_string(),
            auto_pay_after_polls,
        }
    }

    #[cfg(test)]
    pub async fn order(&self, order_id: &OrderId) -> Option<SandboxOrder> {
        self.orders.lock().await.get(order_id).cloned()
    }
}

fn not_found(order_id: &OrderId) -> ApiError {
    ApiError::new(ErrorCode::NotFound, format!("Order {order_id} tidak ditemukan"))
}

pub async fn create_order(
    ctx: &ApiContext,
    request: CreateOrderRequest,
) -> Result<Order, ApiError> {
    let package = request.validate()?;
    let total = package
        .unit_price(request.currency)
        .checked_mul(request.qty)
        .ok_or_else(|| ApiError::new(ErrorCode::Validation, "order total is too large"))?;

    let order_id = OrderId(format!("ORD-{}", Uuid::new_v4().simple()));
    let pay_url = format!(
        "{}{}?orderId={}",
        ctx.public_url,
        sandbox_pay_route(),
        order_id
    );
    info!(
        %order_id,
        package = package.code,
        qty = request.qty,
        %total,
        "sandbox order created"
    );

    let record = SandboxOrder {
        order_id: order_id.clone(),
        request,
        total: total.to_string(),
        status: OrderStatus::Pending,
        detail: None,
        polls: 0,
        created_at: Utc::now(),
    };
    ctx.orders.lock().await.insert(order_id.clone(), record);

    Ok(Order {
        order_id,
        pay_url: Some(pay_url),
    })
}

pub async fn order_status(
    ctx: &ApiContext,
    order_id: &OrderId,
) -> Result<OrderStatusResponse, ApiError> {
    let mut orders = ctx.orders.lock().await;
    let order = orders.get_mut(order_id).ok_or_else(|| not_found(order_id))?;
    order.polls += 1;
    if order.status == OrderStatus::Pending
        && ctx
            .auto_pay_after_polls
            .is_some_and(|threshold| order.polls >= threshold)
    {
        info!(%order_id, polls = order.polls, "sandbox auto-pay");
        order.status = OrderStatus::Paid;
    }
    Ok(OrderStatusResponse {
        status: Some(order.status),
        detail: order.detail.clone(),
    })
}

pub async fn mark_paid(ctx: &ApiContext, order_id: &OrderId) -> Result<OrderStatus, ApiError> {
    let mut orders = ctx.orders.lock().await;
    let order = orders.get_mut(order_id).ok_or_else(|| not_found(order_id))?;
    match order.status {
        OrderStatus::Pending => {
            order.status = OrderStatus::Paid;
            info!(
                %order_id,
                total = %order.total,
                created_at = %order.created_at,
                "sandbox payment received"
            );
            Ok(order.status)
        }
        OrderStatus::Paid | OrderStatus::Delivered => Ok(order.status),
        OrderStatus::Failed | OrderStatus::Unknown => Err(ApiError::new(
            ErrorCode::Conflict,
            format!("Order {order_id} sudah {}", order.status),
        )),
    }
}

pub async fn mark_failed(
    ctx: &ApiContext,
    order_id: &OrderId,
    detail: Option<String>,
) -> Result<OrderStatus, ApiError> {
    let mut orders = ctx.orders.lock().await;
    let order = orders.get_mut(order_id).ok_or_else(|| not_found(order_id))?;
    if order.status == OrderStatus::Delivered {
        return Err(ApiError::new(
            ErrorCode::Conflict,
            format!("Order {order_id} sudah delivered"),
        ));
    }
    order.status = OrderStatus::Failed;
    order.detail = detail;
    info!(%order_id, detail = ?order.detail, "sandbox payment failed");
    Ok(order.status)
}

pub async fn trigger_topup(
    ctx: &ApiContext,
    order_id: &OrderId,
) -> Result<TriggerTopupResponse, ApiError> {
    let mut orders = ctx.orders.lock().await;
    let order = orders.get_mut(order_id).ok_or_else(|| not_found(order_id))?;
    match order.status {
        OrderStatus::Paid => {
            order.status = OrderStatus::Delivered;
            info!(
                %order_id,
                player_id = %order.request.player_id,
                zone = order.request.zone,
                package = %order.request.package_code,
                "sandbox topup delivered"
            );
        }
        OrderStatus::Delivered => {}
        OrderStatus::Pending | OrderStatus::Unknown => {
            return Err(ApiError::new(ErrorCode::Conflict, "Order belum dibayar"));
        }
        OrderStatus::Failed => {
            return Err(ApiError::new(ErrorCode::Conflict, "Order gagal, top-up dibatalkan"));
        }
    }
    Ok(TriggerTopupResponse {
        status: Some(order.status.to_string()),
    })
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
