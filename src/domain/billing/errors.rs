//! Billing-specific error types.
//!
//! Errors related to webhook ingestion, gateway calls, and admin operations.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | InvalidSignature | 401 |
//! | MalformedPayload | 400 |
//! | MissingReference | 400 |
//! | UnknownPlan | 400 |
//! | InvalidRequest | 400 |
//! | Unauthorized | 401 |
//! | TransactionNotSuccessful | 400 |
//! | Gateway | 502 |
//! | Infrastructure | 500 |
//!
//! Duplicate deliveries and unresolved profiles are outcomes, not errors;
//! see `EntitlementResult` and `InsertOutcome`.

use super::normalizer::NormalizeError;
use crate::domain::foundation::DomainError;

/// Billing-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingError {
    /// Webhook signature verification failed. Terminal for this delivery;
    /// the gateway may redeliver, which is verified independently.
    InvalidSignature,

    /// Webhook body was not valid JSON.
    MalformedPayload { reason: String },

    /// Webhook body lacked the mandatory transaction reference.
    MissingReference,

    /// Plan name not recognized by the platform.
    UnknownPlan(String),

    /// A request field was missing or invalid.
    InvalidRequest { field: String, message: String },

    /// Admin API key missing or wrong.
    Unauthorized,

    /// Gateway reported the transaction as anything other than success.
    TransactionNotSuccessful { reference: String, status: String },

    /// Outbound gateway call failed.
    Gateway { reason: String },

    /// Storage or other infrastructure failure. Surfaced as a 500 so the
    /// gateway redelivers; redelivery is the recovery mechanism.
    Infrastructure(String),
}

impl BillingError {
    pub fn malformed_payload(reason: impl Into<String>) -> Self {
        BillingError::MalformedPayload {
            reason: reason.into(),
        }
    }

    pub fn unknown_plan(plan: impl Into<String>) -> Self {
        BillingError::UnknownPlan(plan.into())
    }

    pub fn invalid_request(field: impl Into<String>, message: impl Into<String>) -> Self {
        BillingError::InvalidRequest {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn transaction_not_successful(
        reference: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        BillingError::TransactionNotSuccessful {
            reference: reference.into(),
            status: status.into(),
        }
    }

    pub fn gateway(reason: impl Into<String>) -> Self {
        BillingError::Gateway {
            reason: reason.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        BillingError::Infrastructure(message.into())
    }
}

impl std::fmt::Display for BillingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BillingError::InvalidSignature => write!(f, "invalid webhook signature"),
            BillingError::MalformedPayload { reason } => {
                write!(f, "malformed webhook payload: {}", reason)
            }
            BillingError::MissingReference => {
                write!(f, "webhook payload has no transaction reference")
            }
            BillingError::UnknownPlan(plan) => write!(f, "unknown plan '{}'", plan),
            BillingError::InvalidRequest { field, message } => {
                write!(f, "invalid request field '{}': {}", field, message)
            }
            BillingError::Unauthorized => write!(f, "unauthorized"),
            BillingError::TransactionNotSuccessful { reference, status } => {
                write!(f, "transaction '{}' not successful: {}", reference, status)
            }
            BillingError::Gateway { reason } => write!(f, "gateway error: {}", reason),
            BillingError::Infrastructure(message) => {
                write!(f, "infrastructure error: {}", message)
            }
        }
    }
}

impl std::error::Error for BillingError {}

impl From<NormalizeError> for BillingError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::InvalidJson(reason) => BillingError::MalformedPayload { reason },
            NormalizeError::MissingReference => BillingError::MissingReference,
        }
    }
}

impl From<DomainError> for BillingError {
    fn from(err: DomainError) -> Self {
        BillingError::Infrastructure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    #[test]
    fn display_includes_context() {
        let err = BillingError::unknown_plan("gold");
        assert_eq!(err.to_string(), "unknown plan 'gold'");

        let err = BillingError::transaction_not_successful("ref_1", "abandoned");
        assert!(err.to_string().contains("ref_1"));
        assert!(err.to_string().contains("abandoned"));
    }

    #[test]
    fn normalize_errors_convert() {
        let err: BillingError = NormalizeError::MissingReference.into();
        assert_eq!(err, BillingError::MissingReference);

        let err: BillingError = NormalizeError::InvalidJson("eof".to_string()).into();
        assert!(matches!(err, BillingError::MalformedPayload { .. }));
    }

    #[test]
    fn domain_errors_convert_to_infrastructure() {
        let err: BillingError =
            DomainError::new(ErrorCode::DatabaseError, "connection refused").into();
        assert!(matches!(err, BillingError::Infrastructure(_)));
    }
}
