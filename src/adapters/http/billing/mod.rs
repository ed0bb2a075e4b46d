//! Billing HTTP module.

mod dto;
mod handlers;
mod routes;

pub use dto::*;
pub use handlers::{
    admin_control, handle_paystack_webhook, health, init_checkout, list_recent_payments,
    verify_checkout, BillingApiError, BillingAppState,
};
pub use routes::{admin_routes, billing_router, billing_routes};
