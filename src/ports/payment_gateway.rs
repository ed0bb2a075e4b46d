//! Payment gateway port for outbound Paystack calls.
//!
//! Covers the two outbound flows: initializing a checkout for a plan, and
//! the pull-based transaction verification used by the checkout success
//! redirect (the push-based webhook path needs no outbound call).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::billing::{BillingError, Plan};

/// Request to initialize a hosted checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeCheckoutRequest {
    /// Purchaser email, pre-filled on the gateway's payment page.
    pub email: String,

    /// Plan being purchased; recorded in transaction metadata.
    pub plan: Plan,

    /// Amount in minor units (kobo).
    pub amount_minor_units: i64,

    /// Internal user id, recorded in transaction metadata when known.
    pub user_id: Option<String>,

    /// URL the gateway redirects to after payment.
    pub callback_url: String,
}

/// A checkout the gateway is ready to collect payment for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutIntent {
    /// Hosted payment page URL for the purchaser.
    pub authorization_url: String,

    /// Gateway reference assigned to the pending transaction.
    pub reference: String,
}

/// A transaction as reported by the gateway's verify endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayTransaction {
    pub reference: String,

    /// Gateway status string (`success`, `failed`, `abandoned`, ...).
    pub status: String,

    pub amount_minor_units: i64,

    /// Purchaser email, lower-cased.
    pub customer_email: Option<String>,

    /// Plan name from transaction metadata.
    pub plan_hint: Option<String>,

    /// Internal user id from transaction metadata.
    pub user_id_hint: Option<String>,

    /// Verbatim transaction object from the gateway.
    pub raw: serde_json::Value,
}

impl GatewayTransaction {
    /// True when the gateway settled the transaction successfully.
    pub fn is_successful(&self) -> bool {
        self.status == "success"
    }
}

/// Errors from gateway operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    pub code: GatewayErrorCode,
    pub message: String,
}

impl GatewayError {
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::ApiError, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidResponse, message)
    }

    pub fn not_found(reference: &str) -> Self {
        Self::new(
            GatewayErrorCode::NotFound,
            format!("transaction '{}' not found", reference),
        )
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for BillingError {
    fn from(err: GatewayError) -> Self {
        BillingError::gateway(err.to_string())
    }
}

/// Gateway error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorCode {
    /// Network connectivity issue; retryable.
    NetworkError,

    /// The gateway rejected the call.
    ApiError,

    /// The gateway response could not be interpreted.
    InvalidResponse,

    /// Transaction reference unknown to the gateway.
    NotFound,
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::NetworkError => "network_error",
            GatewayErrorCode::ApiError => "api_error",
            GatewayErrorCode::InvalidResponse => "invalid_response",
            GatewayErrorCode::NotFound => "not_found",
        };
        write!(f, "{}", s)
    }
}

/// Port for payment gateway integrations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Initializes a hosted checkout for a plan purchase.
    async fn initialize_checkout(
        &self,
        request: InitializeCheckoutRequest,
    ) -> Result<CheckoutIntent, GatewayError>;

    /// Fetches the authoritative state of a transaction by reference.
    async fn verify_transaction(&self, reference: &str)
        -> Result<GatewayTransaction, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PaymentGateway) {}
    }

    #[test]
    fn transaction_success_check() {
        let tx = GatewayTransaction {
            reference: "ref_1".to_string(),
            status: "success".to_string(),
            amount_minor_units: 500_000,
            customer_email: None,
            plan_hint: None,
            user_id_hint: None,
            raw: serde_json::Value::Null,
        };
        assert!(tx.is_successful());

        let failed = GatewayTransaction {
            status: "abandoned".to_string(),
            ..tx
        };
        assert!(!failed.is_successful());
    }

    #[test]
    fn gateway_error_display() {
        let err = GatewayError::not_found("ref_9");
        assert!(err.to_string().contains("not_found"));
        assert!(err.to_string().contains("ref_9"));
    }

    #[test]
    fn gateway_error_converts_to_billing_error() {
        let err: BillingError = GatewayError::network("timeout").into();
        assert!(matches!(err, BillingError::Gateway { .. }));
    }
}
