//! Axum router configuration for billing endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    admin_control, handle_paystack_webhook, init_checkout, list_recent_payments, verify_checkout,
    BillingAppState,
};

/// Create the public billing router.
///
/// # Routes
///
/// - `POST /paystack/webhook` - gateway notifications (signature verified,
///   no user authentication)
/// - `POST /paystack/init` - initialize a plan checkout
/// - `GET /paystack/verify` - checkout success redirect confirmation
pub fn billing_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/paystack/webhook", post(handle_paystack_webhook))
        .route("/paystack/init", post(init_checkout))
        .route("/paystack/verify", get(verify_checkout))
}

/// Create the admin router.
///
/// All routes are gated by the `x-admin-api-key` header.
///
/// # Routes
///
/// - `POST /control` - operator actions (`sync-all-users`, `sync-pricing`,
///   `toggle-lifetime`)
/// - `GET /payments` - recent ledger records
pub fn admin_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/control", post(admin_control))
        .route("/payments", get(list_recent_payments))
}

/// Create the complete billing module router, mounted under `/api`.
pub fn billing_router() -> Router<BillingAppState> {
    Router::new()
        .nest("/api", billing_routes())
        .nest("/api/admin", admin_routes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use secrecy::SecretString;

    use crate::adapters::memory::{
        InMemoryAuditLog, InMemoryPaymentLedger, InMemoryProfileStore, InMemorySubscriptionStore,
    };
    use crate::adapters::paystack::MockPaystackGateway;
    use crate::domain::billing::PaystackWebhookVerifier;

    fn test_state() -> BillingAppState {
        BillingAppState {
            ledger: Arc::new(InMemoryPaymentLedger::new()),
            profiles: Arc::new(InMemoryProfileStore::new()),
            subscriptions: Arc::new(InMemorySubscriptionStore::new()),
            audit: Arc::new(InMemoryAuditLog::new()),
            gateway: Arc::new(MockPaystackGateway::new()),
            webhook_verifier: PaystackWebhookVerifier::new("sk_test_x"),
            admin_api_key: SecretString::new("ops-key".to_string()),
            site_url: "http://localhost:3000".to_string(),
        }
    }

    #[test]
    fn billing_routes_creates_router() {
        let router = billing_routes();
        let _: Router<()> = router.with_state(test_state());
    }

    #[test]
    fn admin_routes_creates_router() {
        let router = admin_routes();
        let _: Router<()> = router.with_state(test_state());
    }

    #[test]
    fn billing_router_creates_combined_router() {
        let router = billing_router();
        let _: Router<()> = router.with_state(test_state());
    }
}
