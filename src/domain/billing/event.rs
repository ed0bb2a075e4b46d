//! Normalized payment gateway events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Kind of gateway notification, mapped from the provider's event string.
///
/// Unknown kinds map to [`EventKind::Other`] rather than failing, so that new
/// gateway event types are recorded for audit without breaking ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A one-off charge completed successfully.
    ChargeSuccess,

    /// A transaction completed successfully.
    TransactionSuccess,

    /// Any other gateway event.
    Other,
}

impl EventKind {
    /// Maps the gateway's event-type string to an internal kind.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "charge.success" => EventKind::ChargeSuccess,
            "transaction.success" => EventKind::TransactionSuccess,
            _ => EventKind::Other,
        }
    }

    /// Returns true for kinds that represent a completed payment.
    pub fn is_successful_payment(&self) -> bool {
        matches!(self, EventKind::ChargeSuccess | EventKind::TransactionSuccess)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EventKind::ChargeSuccess => "charge_success",
            EventKind::TransactionSuccess => "transaction_success",
            EventKind::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// Normalized gateway notification.
///
/// Created once per inbound webhook call and immutable afterwards. The
/// verbatim payload is retained in `raw` so the event can be audited even if
/// later processing fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEvent {
    /// Normalized event kind.
    pub kind: EventKind,

    /// The gateway's original event-type string.
    pub raw_kind: String,

    /// Gateway-assigned unique transaction identifier. Idempotence key.
    pub reference: String,

    /// Amount in the currency's smallest unit (kobo for NGN).
    pub amount_minor_units: i64,

    /// Transaction status string reported by the gateway, if any.
    pub gateway_status: Option<String>,

    /// Purchaser email, lower-cased for comparison.
    pub customer_email: Option<String>,

    /// Plan name extracted from transaction metadata.
    pub plan_hint: Option<String>,

    /// Internal user id extracted from transaction metadata.
    pub user_id_hint: Option<String>,

    /// When this service ingested the event (not gateway-issued time).
    pub received_at: Timestamp,

    /// Verbatim gateway payload, kept for the audit trail.
    pub raw: serde_json::Value,
}
