//! Storefront client core: order form state, the backend collaborator, and the
//! checkout flow that polls an order through payment and topup.

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod messages;
pub mod poller;
pub mod topup;

pub use backend::{HttpStorefrontBackend, StorefrontBackend};
pub use config::{load_settings, StorefrontSettings};
pub use controller::{FlowEvent, FlowSnapshot, OrderFlowController};
pub use error::StorefrontError;
pub use form::{OrderFormState, OrderSummary};
pub use poller::{OrderStatusPoller, PollConfig, PollOutcome, PollUpdate};
pub use topup::{TopupOutcome, TopupTrigger};

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod backend_tests;

#[cfg(test)]
#[path = "tests/support.rs"]
mod support;
