//! Order form state: the draft being edited, its price, and local validation.

use shared::{
    domain::{Amount, Currency, Order, OrderDraft, Package},
    protocol::CreateOrderRequest,
};
use tracing::{debug, info};

use crate::{
    backend::StorefrontBackend,
    error::{Result, StorefrontError},
};

/// Placeholder shown wherever a value is unavailable.
pub const EMPTY_FIELD: &str = "-";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFormState {
    draft: OrderDraft,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub player_id: String,
    pub zone: u32,
    pub package_label: String,
    pub quantity: u32,
    pub currency: Currency,
    pub total: String,
}

impl OrderSummary {
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Player ID", self.player_id.clone()),
            ("Zone", self.zone.to_string()),
            ("Paket", self.package_label.clone()),
            ("Qty", self.quantity.to_string()),
            ("Currency", self.currency.to_string()),
            ("Total", self.total.clone()),
        ]
    }
}

impl OrderFormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_draft(mut draft: OrderDraft) -> Self {
        draft.zone = draft.zone.max(1);
        draft.quantity = draft.quantity.max(1);
        Self { draft }
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    pub fn player_id_mut(&mut self) -> &mut String {
        &mut self.draft.player_id
    }

    pub fn set_player_id(&mut self, player_id: impl Into<String>) {
        self.draft.player_id = player_id.into();
    }

    pub fn set_zone(&mut self, zone: u32) {
        self.draft.zone = zone.max(1);
    }

    /// Unknown codes are kept as-is; the total then renders as [`EMPTY_FIELD`].
    pub fn select_package(&mut self, code: &str) {
        self.draft.package_code = code.to_string();
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.draft.quantity = quantity.max(1);
    }

    pub fn set_currency(&mut self, currency: Currency) {
        self.draft.currency = currency;
    }

    pub fn selected_package(&self) -> Option<&'static Package> {
        self.draft.package()
    }

    pub fn total(&self) -> Option<Amount> {
        compute_total(&self.draft)
    }

    pub fn formatted_total(&self) -> String {
        format_total(&self.draft)
    }

    pub fn summary(&self) -> OrderSummary {
        let player_id = if self.draft.player_id.is_empty() {
            EMPTY_FIELD.to_string()
        } else {
            self.draft.player_id.clone()
        };
        OrderSummary {
            player_id,
            zone: self.draft.zone,
            package_label: self
                .selected_package()
                .map(|package| package.label.to_string())
                .unwrap_or_else(|| EMPTY_FIELD.to_string()),
            quantity: self.draft.quantity,
            currency: self.draft.currency,
            total: self.formatted_total(),
        }
    }

    pub fn validate(&self) -> Result<CreateOrderRequest> {
        validate_draft(&self.draft)
    }
}

pub fn compute_total(draft: &OrderDraft) -> Option<Amount> {
    draft.total()
}

pub fn format_total(draft: &OrderDraft) -> String {
    compute_total(draft)
        .map(|amount| amount.to_string())
        .unwrap_or_else(|| EMPTY_FIELD.to_string())
}

pub fn package_option_label(package: &Package, currency: Currency) -> String {
    format!("{} - {}", package.label, package.unit_price(currency))
}

pub fn validate_draft(draft: &OrderDraft) -> Result<CreateOrderRequest> {
    if draft.player_id.is_empty() {
        return Err(StorefrontError::missing_player_id());
    }
    Ok(CreateOrderRequest::from(draft))
}

/// Validates locally, then hands the order to the backend.
pub async fn submit(backend: &dyn StorefrontBackend, draft: &OrderDraft) -> Result<Order> {
    let request = validate_draft(draft).inspect_err(|_| {
        debug!("order submission blocked: player id missing");
    })?;
    let order = backend.create_order(&request).await?;
    info!(
        order_id = %order.order_id,
        package = %request.package_code,
        qty = request.qty,
        currency = %request.currency,
        has_pay_url = order.pay_url.is_some(),
        "order created"
    );
    Ok(order)
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
