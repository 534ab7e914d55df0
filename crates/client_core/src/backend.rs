//! Storefront backend collaborator: the trait the flow depends on and its HTTP implementation.

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{Order, OrderId},
    error::ApiError,
    protocol::{
        CreateOrderRequest, OrderStatusResponse, TriggerTopupRequest, TriggerTopupResponse,
        CREATE_ORDER_PATH, ORDER_STATUS_PATH, TRIGGER_TOPUP_PATH,
    },
};
use tracing::{debug, warn};
use url::Url;

use crate::{
    error::{Result, StorefrontError},
    messages,
};

#[async_trait]
pub trait StorefrontBackend: Send + Sync {
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order>;
    async fn order_status(&self, order_id: &OrderId) -> Result<OrderStatusResponse>;
    async fn trigger_topup(&self, order_id: &OrderId) -> Result<TriggerTopupResponse>;
}

pub struct HttpStorefrontBackend {
    http: Client,
    base_url: Url,
}

impl HttpStorefrontBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self> {
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }
}

async fn backend_error(response: Response, fallback: &str) -> StorefrontError {
    let status = response.status();
    let body = match response.json::<ApiError>().await {
        Ok(body) => body,
        Err(err) => {
            debug!(%status, error = %err, "backend error body was not json");
            ApiError::default()
        }
    };
    let message = body.message_or(fallback).to_string();
    warn!(%status, %message, "storefront backend returned an error");
    StorefrontError::Backend {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl StorefrontBackend for HttpStorefrontBackend {
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order> {
        let url = self.endpoint(CREATE_ORDER_PATH)?;
        debug!(
            path = CREATE_ORDER_PATH,
            package = %request.package_code,
            qty = request.qty,
            "creating order"
        );
        let response = self.http.post(url).json(request).send().await?;
        if !response.status().is_success() {
            return Err(backend_error(response, messages::CREATE_ORDER_FAILED).await);
        }
        Ok(response.json().await?)
    }

    async fn order_status(&self, order_id: &OrderId) -> Result<OrderStatusResponse> {
        let url = self.endpoint(ORDER_STATUS_PATH)?;
        let response = self
            .http
            .get(url)
            .query(&[("orderId", order_id.0.as_str())])
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Non-2xx with a readable status body is a normal reply; no `status` means pending.
        let body = response.bytes().await?;
        match serde_json::from_slice::<OrderStatusResponse>(&body) {
            Ok(parsed) => {
                warn!(
                    %status,
                    %order_id,
                    order_status = ?parsed.status,
                    "order status returned non-success with a readable body"
                );
                Ok(parsed)
            }
            Err(err) => {
                warn!(%status, %order_id, error = %err, "order status body unreadable");
                Err(StorefrontError::Backend {
                    status: status.as_u16(),
                    message: status.to_string(),
                })
            }
        }
    }

    async fn trigger_topup(&self, order_id: &OrderId) -> Result<TriggerTopupResponse> {
        let url = self.endpoint(TRIGGER_TOPUP_PATH)?;
        debug!(path = TRIGGER_TOPUP_PATH, %order_id, "triggering topup");
        let response = self
            .http
            .post(url)
            .json(&TriggerTopupRequest {
                order_id: order_id.clone(),
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(backend_error(response, messages::TOPUP_FAILED).await);
        }
        Ok(response.json().await?)
    }
}
