//! HTTP handlers for the billing endpoints.
//!
//! These handlers connect Axum routes to application layer command handlers
//! and own the mapping from billing errors to HTTP status codes.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::application::handlers::billing::{
    ApplyEntitlementHandler, ConfirmTransactionCommand, ConfirmTransactionHandler,
    ProcessWebhookCommand, ProcessWebhookHandler, StartCheckoutCommand, StartCheckoutHandler,
    SyncEntitlementsHandler, ToggleLifetimeCommand, ToggleLifetimeHandler,
};
use crate::domain::billing::{BillingError, PaystackWebhookVerifier};
use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::ports::{AuditLog, PaymentGateway, PaymentLedger, ProfileStore, SubscriptionStore};

use super::dto::{
    AdminActionResponse, AdminControlRequest, CheckoutResponse, ErrorResponse, HealthResponse,
    InitCheckoutRequest, PaymentsResponse, SyncAllResponse, VerifyParams, WebhookAck,
};

/// Number of records returned by the admin payments listing.
const RECENT_PAYMENTS_LIMIT: u32 = 200;

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned per request; all dependencies are Arc-wrapped port handles so
/// tests can wire in-memory implementations.
#[derive(Clone)]
pub struct BillingAppState {
    pub ledger: Arc<dyn PaymentLedger>,
    pub profiles: Arc<dyn ProfileStore>,
    pub subscriptions: Arc<dyn SubscriptionStore>,
    pub audit: Arc<dyn AuditLog>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub webhook_verifier: PaystackWebhookVerifier,
    pub admin_api_key: SecretString,
    pub site_url: String,
}

impl BillingAppState {
    /// Create handlers on demand from the shared state.
    pub fn entitlement_handler(&self) -> ApplyEntitlementHandler {
        ApplyEntitlementHandler::new(
            self.profiles.clone(),
            self.subscriptions.clone(),
            self.audit.clone(),
        )
    }

    pub fn webhook_handler(&self) -> ProcessWebhookHandler {
        ProcessWebhookHandler::new(
            self.webhook_verifier.clone(),
            self.ledger.clone(),
            self.entitlement_handler(),
        )
    }

    pub fn confirm_handler(&self) -> ConfirmTransactionHandler {
        ConfirmTransactionHandler::new(
            self.gateway.clone(),
            self.ledger.clone(),
            self.entitlement_handler(),
        )
    }

    pub fn checkout_handler(&self) -> StartCheckoutHandler {
        StartCheckoutHandler::new(self.gateway.clone(), self.site_url.clone())
    }

    pub fn sync_handler(&self) -> SyncEntitlementsHandler {
        SyncEntitlementsHandler::new(
            self.subscriptions.clone(),
            self.profiles.clone(),
            self.audit.clone(),
        )
    }

    pub fn toggle_lifetime_handler(&self) -> ToggleLifetimeHandler {
        ToggleLifetimeHandler::new(
            self.profiles.clone(),
            self.subscriptions.clone(),
            self.audit.clone(),
        )
    }

    /// Checks the static admin API key header.
    fn authorize_admin(&self, headers: &HeaderMap) -> Result<(), BillingError> {
        let provided = headers
            .get("x-admin-api-key")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        let expected = self.admin_api_key.expose_secret();

        // Fail closed on unset keys; compare in constant time.
        if provided.is_empty() || expected.is_empty() {
            return Err(BillingError::Unauthorized);
        }
        if provided.len() != expected.len() {
            return Err(BillingError::Unauthorized);
        }
        if provided.as_bytes().ct_eq(expected.as_bytes()).unwrap_u8() != 1 {
            return Err(BillingError::Unauthorized);
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Public Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /health - liveness probe for orchestration / load balancers
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        ts: Timestamp::now().as_unix_secs(),
    })
}

/// POST /api/paystack/webhook - gateway notification ingestion
///
/// The body is taken as raw bytes because the signature covers the exact
/// bytes sent, not any re-serialization of them. A missing signature header
/// verifies as false and is rejected 401, the same as a wrong one.
pub async fn handle_paystack_webhook(
    State(state): State<BillingAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, BillingApiError> {
    let signature = headers
        .get("x-paystack-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let handler = state.webhook_handler();
    let cmd = ProcessWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    let result = handler.handle(cmd).await?;

    Ok(Json(WebhookAck::from(result)))
}

/// GET /api/paystack/verify - checkout success redirect
///
/// Pull-based confirmation: asks the gateway for the transaction state,
/// feeds the idempotent pipeline, and redirects the purchaser to the
/// dashboard for their plan.
pub async fn verify_checkout(
    State(state): State<BillingAppState>,
    Query(params): Query<VerifyParams>,
) -> Result<Redirect, BillingApiError> {
    let reference = params
        .reference()
        .ok_or_else(|| BillingError::invalid_request("reference", "required"))?;

    let handler = state.confirm_handler();
    let result = handler
        .handle(ConfirmTransactionCommand {
            reference: reference.to_string(),
        })
        .await?;

    let mut url = reqwest::Url::parse(&state.site_url)
        .map_err(|e| BillingError::infrastructure(format!("invalid site url: {}", e)))?;
    url.set_path(&result.redirect_path);
    url.query_pairs_mut()
        .append_pair("reference", &result.reference);

    Ok(Redirect::to(url.as_str()))
}

/// POST /api/paystack/init - initialize a plan checkout
pub async fn init_checkout(
    State(state): State<BillingAppState>,
    Json(request): Json<InitCheckoutRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.checkout_handler();
    let intent = handler
        .handle(StartCheckoutCommand {
            plan: request.plan,
            email: request.email,
            user_id: request.user_id,
        })
        .await?;

    Ok(Json(CheckoutResponse {
        authorization_url: intent.authorization_url,
        reference: intent.reference,
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Admin Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/admin/control - operator actions, gated by `x-admin-api-key`
pub async fn admin_control(
    State(state): State<BillingAppState>,
    headers: HeaderMap,
    Json(request): Json<AdminControlRequest>,
) -> Result<Response, BillingApiError> {
    state.authorize_admin(&headers)?;

    match request.action.as_str() {
        "sync-all-users" => {
            let report = state.sync_handler().sync_all().await.map_err(BillingError::from)?;
            Ok(Json(SyncAllResponse::from(report)).into_response())
        }
        "sync-pricing" => {
            let user_id = request
                .user_id
                .as_deref()
                .and_then(|s| UserId::new(s).ok())
                .ok_or_else(|| BillingError::invalid_request("userId", "required"))?;
            let tier = request
                .tier
                .as_deref()
                .ok_or_else(|| BillingError::invalid_request("tier", "required"))?;

            let result = state.sync_handler().sync_one(&user_id, tier).await?;
            Ok(Json(AdminActionResponse::from_entitlement(&result)).into_response())
        }
        "toggle-lifetime" => {
            let email = request
                .email
                .ok_or_else(|| BillingError::invalid_request("email", "required"))?;
            let set = request
                .set
                .ok_or_else(|| BillingError::invalid_request("set", "required"))?;

            state
                .toggle_lifetime_handler()
                .handle(ToggleLifetimeCommand { email, set })
                .await?;
            Ok(Json(AdminActionResponse::ok("toggled")).into_response())
        }
        other => Err(BillingError::invalid_request(
            "action",
            format!("unknown action '{}'", other),
        )
        .into()),
    }
}

/// GET /api/admin/payments - recent ledger records, gated by `x-admin-api-key`
pub async fn list_recent_payments(
    State(state): State<BillingAppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, BillingApiError> {
    state.authorize_admin(&headers)?;

    let records = state
        .ledger
        .list_recent_records(RECENT_PAYMENTS_LIMIT)
        .await
        .map_err(BillingError::from)?;

    Ok(Json(PaymentsResponse {
        payments: records.into_iter().map(Into::into).collect(),
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts billing errors to HTTP responses.
#[derive(Debug)]
pub struct BillingApiError(BillingError);

impl From<BillingError> for BillingApiError {
    fn from(err: BillingError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for BillingApiError {
    fn from(err: DomainError) -> Self {
        Self(BillingError::from(err))
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            BillingError::InvalidSignature => (StatusCode::UNAUTHORIZED, "INVALID_SIGNATURE"),
            BillingError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            BillingError::MalformedPayload { .. } => (StatusCode::BAD_REQUEST, "MALFORMED_PAYLOAD"),
            BillingError::MissingReference => (StatusCode::BAD_REQUEST, "MISSING_REFERENCE"),
            BillingError::UnknownPlan(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_PLAN"),
            BillingError::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            BillingError::TransactionNotSuccessful { .. } => {
                (StatusCode::BAD_REQUEST, "PAYMENT_NOT_SUCCESSFUL")
            }
            BillingError::Gateway { .. } => (StatusCode::BAD_GATEWAY, "GATEWAY_ERROR"),
            BillingError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }

        let body = ErrorResponse::new(code, self.0.to_string());
        (status, Json(body)).into_response()
    }
}
