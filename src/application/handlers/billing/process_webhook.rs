//! ProcessWebhookHandler - the push-based ingestion path.
//!
//! gateway -> signature verification -> normalization -> ledger -> entitlement

use std::sync::Arc;

use crate::domain::billing::{
    normalize, BillingError, EntitlementResult, PaymentRecord, PaystackWebhookVerifier,
};
use crate::domain::foundation::Timestamp;
use crate::ports::{InsertOutcome, PaymentLedger};

use super::apply_entitlement::ApplyEntitlementHandler;

/// Command carrying one webhook delivery.
///
/// `payload` is the exact raw body received; signature verification runs on
/// these bytes, never on re-serialized JSON.
#[derive(Debug, Clone)]
pub struct ProcessWebhookCommand {
    /// Raw webhook body.
    pub payload: Vec<u8>,
    /// Value of the `x-paystack-signature` header.
    pub signature: String,
}

/// Result of webhook processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessWebhookResult {
    /// First delivery: event appended, record inserted, entitlement decided.
    Recorded {
        reference: String,
        entitlement: EntitlementResult,
    },
    /// Redelivery of an already-recorded reference. Explicit no-op.
    Duplicate { reference: String },
}

/// Handler for inbound gateway webhooks.
pub struct ProcessWebhookHandler {
    verifier: PaystackWebhookVerifier,
    ledger: Arc<dyn PaymentLedger>,
    entitlements: ApplyEntitlementHandler,
}

impl ProcessWebhookHandler {
    pub fn new(
        verifier: PaystackWebhookVerifier,
        ledger: Arc<dyn PaymentLedger>,
        entitlements: ApplyEntitlementHandler,
    ) -> Self {
        Self {
            verifier,
            ledger,
            entitlements,
        }
    }

    pub async fn handle(
        &self,
        cmd: ProcessWebhookCommand,
    ) -> Result<ProcessWebhookResult, BillingError> {
        // 1. Authenticate the delivery. Terminal on failure; a gateway
        //    redelivery arrives as a fresh, independently-verified call.
        if !self.verifier.verify(&cmd.payload, &cmd.signature) {
            tracing::warn!("Rejected webhook with invalid signature");
            return Err(BillingError::InvalidSignature);
        }

        // 2. Normalize. Unknown event kinds pass through as `other`; only a
        //    structurally unusable payload is rejected.
        let event = normalize(&cmd.payload, Timestamp::now())?;

        // 3. Persist the raw event for audit regardless of what follows.
        self.ledger.append_event(&event).await?;

        // 4. Idempotent record insert; the unique reference is the
        //    at-least-once tolerance boundary.
        let record = PaymentRecord::from_event(&event);
        match self.ledger.insert_record(&record).await? {
            InsertOutcome::DuplicateSkipped => {
                tracing::debug!(
                    reference = %record.reference,
                    kind = %event.kind,
                    "Duplicate webhook delivery skipped"
                );
                Ok(ProcessWebhookResult::Duplicate {
                    reference: record.reference,
                })
            }
            InsertOutcome::Inserted => {
                // 5. Entitlement update for the freshly recorded payment.
                let entitlement = self.entitlements.handle(&record).await?;
                tracing::info!(
                    reference = %record.reference,
                    kind = %event.kind,
                    outcome = entitlement.outcome(),
                    "Webhook processed"
                );
                Ok(ProcessWebhookResult::Recorded {
                    reference: record.reference,
                    entitlement,
                })
            }
        }
    }
}
