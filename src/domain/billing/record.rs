//! Payment ledger records.

use serde::{Deserialize, Serialize};

use super::event::PaymentEvent;
use crate::domain::foundation::Timestamp;

/// Settlement status of a recorded payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Success,
    Failed,
    Pending,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Pending => "pending",
        }
    }

    /// Parses a status string from the gateway or the ledger store.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "success" => PaymentStatus::Success,
            "failed" | "abandoned" | "reversed" => PaymentStatus::Failed,
            _ => PaymentStatus::Pending,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ledger entry derived from a [`PaymentEvent`].
///
/// At most one record exists per `reference`; the ledger store enforces the
/// uniqueness so duplicate webhook deliveries cannot create a second record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Gateway transaction reference. Unique key.
    pub reference: String,

    /// Amount in minor units (kobo).
    pub amount_minor_units: i64,

    /// Raw plan hint from event metadata, if any.
    pub plan: Option<String>,

    /// Settlement status.
    pub status: PaymentStatus,

    /// Purchaser email, lower-cased.
    pub customer_email: Option<String>,

    /// Internal user id from event metadata, if any.
    pub user_id_hint: Option<String>,

    /// When the underlying event was ingested.
    pub received_at: Timestamp,
}

impl PaymentRecord {
    /// Derives a ledger record from a normalized event.
    ///
    /// The gateway's explicit transaction status wins; when absent, a
    /// successful event kind implies `success` and anything else stays
    /// `pending`.
    pub fn from_event(event: &PaymentEvent) -> Self {
        let status = match event.gateway_status.as_deref() {
            Some(raw) => PaymentStatus::parse(raw),
            None if event.kind.is_successful_payment() => PaymentStatus::Success,
            None => PaymentStatus::Pending,
        };

        Self {
            reference: event.reference.clone(),
            amount_minor_units: event.amount_minor_units,
            plan: event.plan_hint.clone(),
            status,
            customer_email: event.customer_email.clone(),
            user_id_hint: event.user_id_hint.clone(),
            received_at: event.received_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::normalize_value;
    use serde_json::json;

    fn event_from(value: serde_json::Value) -> PaymentEvent {
        normalize_value(value, Timestamp::now()).unwrap()
    }

    #[test]
    fn explicit_gateway_status_wins() {
        let event = event_from(json!({
            "event": "charge.success",
            "data": { "reference": "ref_1", "status": "abandoned" }
        }));
        let record = PaymentRecord::from_event(&event);
        assert_eq!(record.status, PaymentStatus::Failed);
    }

    #[test]
    fn successful_kind_implies_success_when_status_absent() {
        let event = event_from(json!({
            "event": "charge.success",
            "data": { "reference": "ref_2" }
        }));
        let record = PaymentRecord::from_event(&event);
        assert_eq!(record.status, PaymentStatus::Success);
    }

    #[test]
    fn other_kind_without_status_stays_pending() {
        let event = event_from(json!({
            "event": "subscription.create",
            "data": { "reference": "ref_3" }
        }));
        let record = PaymentRecord::from_event(&event);
        assert_eq!(record.status, PaymentStatus::Pending);
    }

    #[test]
    fn record_carries_event_fields() {
        let event = event_from(json!({
            "event": "charge.success",
            "data": {
                "reference": "ref_4",
                "amount": 9_000_000,
                "customer": { "email": "b@x.com" },
                "metadata": { "plan": "premium", "userId": "user-9" }
            }
        }));
        let record = PaymentRecord::from_event(&event);

        assert_eq!(record.reference, "ref_4");
        assert_eq!(record.amount_minor_units, 9_000_000);
        assert_eq!(record.plan.as_deref(), Some("premium"));
        assert_eq!(record.customer_email.as_deref(), Some("b@x.com"));
        assert_eq!(record.user_id_hint.as_deref(), Some("user-9"));
    }

    #[test]
    fn status_parse_maps_gateway_terms() {
        assert_eq!(PaymentStatus::parse("success"), PaymentStatus::Success);
        assert_eq!(PaymentStatus::parse("failed"), PaymentStatus::Failed);
        assert_eq!(PaymentStatus::parse("reversed"), PaymentStatus::Failed);
        assert_eq!(PaymentStatus::parse("ongoing"), PaymentStatus::Pending);
    }
}
