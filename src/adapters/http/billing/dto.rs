//! Request and response DTOs for the billing HTTP endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::billing::{ProcessWebhookResult, SyncReport};
use crate::domain::billing::{EntitlementResult, PaymentRecord};

/// Error payload returned for all failed requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Acknowledgement returned to the gateway for an ingested webhook.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
    pub outcome: &'static str,
    pub reference: String,
}

impl From<ProcessWebhookResult> for WebhookAck {
    fn from(result: ProcessWebhookResult) -> Self {
        match result {
            ProcessWebhookResult::Recorded {
                reference,
                entitlement,
            } => Self {
                status: "ok",
                outcome: entitlement.outcome(),
                reference,
            },
            ProcessWebhookResult::Duplicate { reference } => Self {
                status: "ok",
                outcome: "duplicate",
                reference,
            },
        }
    }
}

/// Query parameters of the checkout success redirect.
///
/// Accepts both `reference` and the legacy `ref` parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyParams {
    pub reference: Option<String>,
    #[serde(rename = "ref")]
    pub legacy_ref: Option<String>,
}

impl VerifyParams {
    pub fn reference(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .or(self.legacy_ref.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// Request to initialize a checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct InitCheckoutRequest {
    pub plan: String,
    pub email: String,
    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,
}

/// Response with the gateway's hosted payment page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub authorization_url: String,
    pub reference: String,
}

/// Admin control request; the action decides which fields are required.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminControlRequest {
    pub action: String,

    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,

    #[serde(default)]
    pub tier: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub set: Option<bool>,
}

/// Response for `sync-all-users`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncAllResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub total_processed: u32,
    pub total_synced: u32,
}

impl From<SyncReport> for SyncAllResponse {
    fn from(report: SyncReport) -> Self {
        Self {
            status: "ok",
            message: "All users synced",
            total_processed: report.processed,
            total_synced: report.synced,
        }
    }
}

/// Response for `sync-pricing` and `toggle-lifetime`.
#[derive(Debug, Clone, Serialize)]
pub struct AdminActionResponse {
    pub status: &'static str,
    pub outcome: &'static str,
}

impl AdminActionResponse {
    pub fn ok(outcome: &'static str) -> Self {
        Self {
            status: "ok",
            outcome,
        }
    }

    pub fn from_entitlement(result: &EntitlementResult) -> Self {
        Self {
            status: "ok",
            outcome: result.outcome(),
        }
    }
}

/// One ledger record in the admin payments listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecordDto {
    pub reference: String,
    pub amount: i64,
    pub plan: Option<String>,
    pub status: String,
    pub customer_email: Option<String>,
    pub received_at: String,
}

impl From<PaymentRecord> for PaymentRecordDto {
    fn from(record: PaymentRecord) -> Self {
        Self {
            reference: record.reference,
            amount: record.amount_minor_units,
            plan: record.plan,
            status: record.status.to_string(),
            customer_email: record.customer_email,
            received_at: record.received_at.to_string(),
        }
    }
}

/// Admin payments listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentsResponse {
    pub payments: Vec<PaymentRecordDto>,
}

/// Liveness probe response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ts: i64,
}
