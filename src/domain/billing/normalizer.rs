//! Gateway payload normalization.
//!
//! Paystack payloads carry the purchaser email and plan metadata in several
//! optional nested locations. This module centralizes the extraction in one
//! precedence-ordered function so the rule is testable and auditable rather
//! than scattered through the codebase.
//!
//! # Extraction precedence
//!
//! - email: `data.metadata.email` > `data.customer.email` > `data.email`
//! - plan:  `data.metadata.plan` > `data.metadata.product`
//! - user:  `data.metadata.userId` > `data.metadata.user_id`

use serde_json::Value;
use thiserror::Error;

use super::event::{EventKind, PaymentEvent};
use crate::domain::foundation::Timestamp;

/// Errors produced while normalizing a raw gateway payload.
///
/// Only structural failures are errors; unknown event kinds and absent
/// optional fields are not.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("payload has no transaction reference")]
    MissingReference,
}

/// Parses and normalizes a raw webhook body.
pub fn normalize(raw: &[u8], received_at: Timestamp) -> Result<PaymentEvent, NormalizeError> {
    let value: Value =
        serde_json::from_slice(raw).map_err(|e| NormalizeError::InvalidJson(e.to_string()))?;
    normalize_value(value, received_at)
}

/// Normalizes an already-parsed gateway payload.
pub fn normalize_value(value: Value, received_at: Timestamp) -> Result<PaymentEvent, NormalizeError> {
    let raw_kind = value
        .get("event")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let kind = EventKind::parse(&raw_kind);

    let data = value.get("data").cloned().unwrap_or(Value::Null);

    // The reference is the idempotence key, so it is the one mandatory field.
    let reference = non_empty_str(data.get("reference"))
        .ok_or(NormalizeError::MissingReference)?
        .to_string();

    let amount_minor_units = data.get("amount").and_then(Value::as_i64).unwrap_or(0);
    let gateway_status = non_empty_str(data.get("status")).map(str::to_string);

    let metadata = data.get("metadata");

    let customer_email = [
        metadata.and_then(|m| m.get("email")),
        data.get("customer").and_then(|c| c.get("email")),
        data.get("email"),
    ]
    .into_iter()
    .find_map(non_empty_str)
    .map(|s| s.to_lowercase());

    let plan_hint = [
        metadata.and_then(|m| m.get("plan")),
        metadata.and_then(|m| m.get("product")),
    ]
    .into_iter()
    .find_map(non_empty_str)
    .map(str::to_string);

    let user_id_hint = [
        metadata.and_then(|m| m.get("userId")),
        metadata.and_then(|m| m.get("user_id")),
    ]
    .into_iter()
    .find_map(non_empty_str)
    .map(str::to_string);

    Ok(PaymentEvent {
        kind,
        raw_kind,
        reference,
        amount_minor_units,
        gateway_status,
        customer_email,
        plan_hint,
        user_id_hint,
        received_at,
        raw: value,
    })
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
