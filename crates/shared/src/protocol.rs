use serde::{Deserialize, Serialize};

use crate::{
    domain::{find_package, Currency, OrderDraft, OrderId, OrderStatus, Package},
    error::DraftError,
};

pub const CREATE_ORDER_PATH: &str = "/api/create-order";
pub const ORDER_STATUS_PATH: &str = "/api/order-status";
pub const TRIGGER_TOPUP_PATH: &str = "/api/trigger-topup";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub player_id: String,
    pub zone: u32,
    pub package_code: String,
    pub qty: u32,
    pub currency: Currency,
}

impl CreateOrderRequest {
    pub fn validate(&self) -> Result<&'static Package, DraftError> {
        if self.player_id.trim().is_empty() {
            return Err(DraftError::MissingPlayerId);
        }
        if self.zone == 0 {
            return Err(DraftError::InvalidZone);
        }
        if self.qty == 0 {
            return Err(DraftError::InvalidQuantity);
        }
        find_package(&self.package_code)
            .ok_or_else(|| DraftError::UnknownPackage(self.package_code.clone()))
    }
}

impl From<&OrderDraft> for CreateOrderRequest {
    fn from(draft: &OrderDraft) -> Self {
        Self {
            player_id: draft.player_id.clone(),
            zone: draft.zone,
            package_code: draft.package_code.clone(),
            qty: draft.quantity,
            currency: draft.currency,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusQuery {
    pub order_id: OrderId,
}

/// `status` may be absent or carry a value outside the known set; both read as "still waiting".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusResponse {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerTopupRequest {
    pub order_id: OrderId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerTopupResponse {
    #[serde(default)]
    pub status: Option<String>,
}

impl TriggerTopupResponse {
    pub fn is_delivered(&self) -> bool {
        self.status.as_deref() == Some(OrderStatus::Delivered.as_str())
    }
}
