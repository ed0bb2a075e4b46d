//! Paystack API adapter.
//!
//! Implements the `PaymentGateway` trait against the Paystack REST API:
//! `POST /transaction/initialize` for checkouts and
//! `GET /transaction/verify/:reference` for pull-based confirmation.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};

use crate::config::PaystackConfig;
use crate::ports::{
    CheckoutIntent, GatewayError, GatewayTransaction, InitializeCheckoutRequest, PaymentGateway,
};

/// Paystack payment gateway adapter.
pub struct PaystackGateway {
    secret_key: SecretString,
    api_base_url: String,
    http_client: reqwest::Client,
}

impl PaystackGateway {
    /// Creates a new adapter from the loaded configuration.
    pub fn new(config: &PaystackConfig) -> Self {
        Self {
            secret_key: SecretString::new(config.secret_key.clone()),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Unwraps Paystack's `{status, message, data}` envelope.
    fn unwrap_envelope(body: Value) -> Result<Value, GatewayError> {
        let ok = body.get("status").and_then(Value::as_bool).unwrap_or(false);
        if !ok {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("gateway call failed");
            return Err(GatewayError::api(message));
        }
        body.get("data")
            .cloned()
            .ok_or_else(|| GatewayError::invalid_response("missing data object"))
    }
}

#[async_trait]
impl PaymentGateway for PaystackGateway {
    async fn initialize_checkout(
        &self,
        request: InitializeCheckoutRequest,
    ) -> Result<CheckoutIntent, GatewayError> {
        let body = json!({
            "email": request.email,
            "amount": request.amount_minor_units,
            "metadata": {
                "plan": request.plan.as_str(),
                "email": request.email,
                "userId": request.user_id,
            },
            "callback_url": request.callback_url,
        });

        let response = self
            .http_client
            .post(format!("{}/transaction/initialize", self.api_base_url))
            .bearer_auth(self.secret_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        let payload: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::invalid_response(e.to_string()))?;
        let data = Self::unwrap_envelope(payload)?;

        checkout_intent_from_value(&data)
    }

    async fn verify_transaction(
        &self,
        reference: &str,
    ) -> Result<GatewayTransaction, GatewayError> {
        // The reference is caller-supplied on the redirect path, so it is
        // pushed as a path segment to get percent-encoding.
        let mut url = reqwest::Url::parse(&self.api_base_url)
            .map_err(|e| GatewayError::invalid_response(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::invalid_response("api base url cannot be a base"))?
            .extend(["transaction", "verify", reference]);

        let response = self
            .http_client
            .get(url)
            .bearer_auth(self.secret_key.expose_secret())
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::not_found(reference));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::invalid_response(e.to_string()))?;
        let data = Self::unwrap_envelope(payload)?;

        Ok(transaction_from_value(&data))
    }
}

fn checkout_intent_from_value(data: &Value) -> Result<CheckoutIntent, GatewayError> {
    let authorization_url = data
        .get("authorization_url")
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::invalid_response("missing authorization_url"))?
        .to_string();
    let reference = data
        .get("reference")
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::invalid_response("missing reference"))?
        .to_string();

    Ok(CheckoutIntent {
        authorization_url,
        reference,
    })
}

/// Maps a verify-endpoint transaction object to the port type.
///
/// Field extraction mirrors the webhook normalizer's precedence: metadata
/// email over nested customer email, `plan` over `product`.
fn transaction_from_value(data: &Value) -> GatewayTransaction {
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

    GatewayTransaction {
        reference: data
            .get("reference")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        status: data
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        amount_minor_units: data.get("amount").and_then(Value::as_i64).unwrap_or(0),
        customer_email,
        plan_hint,
        user_id_hint,
        raw: data.clone(),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::Plan;

    #[test]
    fn unwrap_envelope_rejects_failed_status() {
        let body = json!({ "status": false, "message": "Invalid key" });
        let err = PaystackGateway::unwrap_envelope(body).unwrap_err();
        assert!(err.to_string().contains("Invalid key"));
    }

    #[test]
    fn unwrap_envelope_rejects_missing_data() {
        let body = json!({ "status": true, "message": "ok" });
        assert!(PaystackGateway::unwrap_envelope(body).is_err());
    }

    #[test]
    fn unwrap_envelope_returns_data() {
        let body = json!({ "status": true, "data": { "reference": "ref_1" } });
        let data = PaystackGateway::unwrap_envelope(body).unwrap();
        assert_eq!(data["reference"], "ref_1");
    }

    #[test]
    fn checkout_intent_requires_both_fields() {
        let data = json!({ "authorization_url": "https://checkout.paystack.com/abc" });
        assert!(checkout_intent_from_value(&data).is_err());

        let data = json!({
            "authorization_url": "https://checkout.paystack.com/abc",
            "reference": "ref_1"
        });
        let intent = checkout_intent_from_value(&data).unwrap();
        assert_eq!(intent.reference, "ref_1");
    }

    #[test]
    fn transaction_mapping_extracts_fields() {
        let data = json!({
            "reference": "ref_1",
            "status": "success",
            "amount": 15_000_000,
            "customer": { "email": "Buyer@X.com" },
            "metadata": { "plan": "vip", "userId": "user-1" }
        });

        let tx = transaction_from_value(&data);

        assert_eq!(tx.reference, "ref_1");
        assert!(tx.is_successful());
        assert_eq!(tx.amount_minor_units, 15_000_000);
        assert_eq!(tx.customer_email.as_deref(), Some("buyer@x.com"));
        assert_eq!(tx.plan_hint.as_deref(), Some(Plan::Vip.as_str()));
        assert_eq!(tx.user_id_hint.as_deref(), Some("user-1"));
    }

    #[test]
    fn transaction_mapping_tolerates_sparse_payloads() {
        let tx = transaction_from_value(&json!({ "reference": "ref_2" }));

        assert_eq!(tx.reference, "ref_2");
        assert!(!tx.is_successful());
        assert_eq!(tx.amount_minor_units, 0);
        assert!(tx.customer_email.is_none());
        assert!(tx.plan_hint.is_none());
    }

    #[test]
    fn metadata_email_wins_over_customer_email() {
        let data = json!({
            "reference": "ref_3",
            "customer": { "email": "nested@x.com" },
            "metadata": { "email": "meta@x.com" }
        });
        let tx = transaction_from_value(&data);
        assert_eq!(tx.customer_email.as_deref(), Some("meta@x.com"));
    }
}
