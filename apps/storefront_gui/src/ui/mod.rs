//! UI layer for the storefront GUI.

pub mod app;

pub use app::StorefrontApp;
