//! ConfirmTransactionHandler - the pull-based verification path.
//!
//! The checkout success redirect lands here with a transaction reference.
//! The gateway is asked for the authoritative transaction state before any
//! crediting happens, then the flow feeds the same idempotent ledger writer
//! and entitlement updater as the webhook path.

use std::sync::Arc;

use crate::domain::billing::{
    BillingError, EntitlementResult, PaymentRecord, PaymentStatus, Plan,
};
use crate::domain::foundation::Timestamp;
use crate::ports::{InsertOutcome, PaymentGateway, PaymentLedger};

use super::apply_entitlement::ApplyEntitlementHandler;

/// Command carrying the redirect's transaction reference.
#[derive(Debug, Clone)]
pub struct ConfirmTransactionCommand {
    pub reference: String,
}

/// Result of a pull-based confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmTransactionResult {
    pub reference: String,

    /// Recognized plan, when the metadata carried one.
    pub plan: Option<Plan>,

    /// True when the webhook path had already recorded this reference.
    pub already_recorded: bool,

    /// Entitlement outcome; `None` when the record was a duplicate and
    /// entitlement was not re-applied.
    pub entitlement: Option<EntitlementResult>,

    /// Dashboard path the purchaser should land on.
    pub redirect_path: String,
}

/// Handler for the checkout success redirect.
pub struct ConfirmTransactionHandler {
    gateway: Arc<dyn PaymentGateway>,
    ledger: Arc<dyn PaymentLedger>,
    entitlements: ApplyEntitlementHandler,
}

impl ConfirmTransactionHandler {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        ledger: Arc<dyn PaymentLedger>,
        entitlements: ApplyEntitlementHandler,
    ) -> Self {
        Self {
            gateway,
            ledger,
            entitlements,
        }
    }

    pub async fn handle(
        &self,
        cmd: ConfirmTransactionCommand,
    ) -> Result<ConfirmTransactionResult, BillingError> {
        if cmd.reference.is_empty() {
            return Err(BillingError::invalid_request("reference", "required"));
        }

        // 1. Independent confirmation with the gateway before crediting.
        let trx = self.gateway.verify_transaction(&cmd.reference).await?;
        if !trx.is_successful() {
            tracing::warn!(
                reference = %trx.reference,
                status = %trx.status,
                "Verified transaction is not successful"
            );
            return Err(BillingError::transaction_not_successful(
                trx.reference,
                trx.status,
            ));
        }

        // 2. Same idempotent record insert as the webhook path; whichever
        //    path gets there first wins and the other skips.
        let record = PaymentRecord {
            reference: trx.reference.clone(),
            amount_minor_units: trx.amount_minor_units,
            plan: trx.plan_hint.clone(),
            status: PaymentStatus::Success,
            customer_email: trx.customer_email.clone(),
            user_id_hint: trx.user_id_hint.clone(),
            received_at: Timestamp::now(),
        };

        let (already_recorded, entitlement) = match self.ledger.insert_record(&record).await? {
            InsertOutcome::Inserted => {
                let entitlement = self.entitlements.handle(&record).await?;
                (false, Some(entitlement))
            }
            InsertOutcome::DuplicateSkipped => {
                tracing::debug!(
                    reference = %record.reference,
                    "Transaction already recorded; entitlement not re-applied"
                );
                (true, None)
            }
        };

        let plan = record.plan.as_deref().and_then(Plan::parse);
        let redirect_path = plan
            .map(|p| p.dashboard_path())
            .unwrap_or("/dashboard")
            .to_string();

        Ok(ConfirmTransactionResult {
            reference: record.reference,
            plan,
            already_recorded,
            entitlement,
            redirect_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryAuditLog, InMemoryPaymentLedger, InMemoryProfileStore, InMemorySubscriptionStore,
    };
    use crate::adapters::paystack::MockPaystackGateway;
    use crate::domain::billing::{Role, UserProfile};
    use crate::domain::foundation::UserId;
    use crate::ports::GatewayTransaction;
    use serde_json::json;

    fn transaction(reference: &str, status: &str, plan: Option<&str>) -> GatewayTransaction {
        GatewayTransaction {
            reference: reference.to_string(),
            status: status.to_string(),
            amount_minor_units: 15_000_000,
            customer_email: Some("a@x.com".to_string()),
            plan_hint: plan.map(str::to_string),
            user_id_hint: None,
            raw: json!({"reference": reference}),
        }
    }

    struct Fixture {
        ledger: Arc<InMemoryPaymentLedger>,
        profiles: Arc<InMemoryProfileStore>,
        handler: ConfirmTransactionHandler,
    }

    fn fixture(gateway: MockPaystackGateway) -> Fixture {
        let profiles = Arc::new(InMemoryProfileStore::with_profiles(vec![UserProfile {
            id: UserId::new("user-1").unwrap(),
            email: "a@x.com".to_string(),
            role: Role::User,
            lifetime: false,
        }]));
        let ledger = Arc::new(InMemoryPaymentLedger::new());
        let entitlements = ApplyEntitlementHandler::new(
            profiles.clone(),
            Arc::new(InMemorySubscriptionStore::new()),
            Arc::new(InMemoryAuditLog::new()),
        );
        let handler =
            ConfirmTransactionHandler::new(Arc::new(gateway), ledger.clone(), entitlements);
        Fixture {
            ledger,
            profiles,
            handler,
        }
    }

    #[tokio::test]
    async fn successful_verification_records_and_entitles() {
        let gateway =
            MockPaystackGateway::with_transaction(transaction("ref_1", "success", Some("vip")));
        let f = fixture(gateway);

        let result = f
            .handler
            .handle(ConfirmTransactionCommand {
                reference: "ref_1".to_string(),
            })
            .await
            .unwrap();

        assert!(!result.already_recorded);
        assert_eq!(result.plan, Some(Plan::Vip));
        assert_eq!(result.redirect_path, "/dashboard/vip");
        assert_eq!(f.ledger.record_count(), 1);
        assert_eq!(f.profiles.get("user-1").unwrap().role, Role::Vip);
    }

    #[tokio::test]
    async fn duplicate_reference_skips_entitlement() {
        let gateway =
            MockPaystackGateway::with_transaction(transaction("ref_1", "success", Some("vip")));
        let f = fixture(gateway);
        let cmd = ConfirmTransactionCommand {
            reference: "ref_1".to_string(),
        };

        f.handler.handle(cmd.clone()).await.unwrap();
        let second = f.handler.handle(cmd).await.unwrap();

        assert!(second.already_recorded);
        assert_eq!(second.entitlement, None);
        assert_eq!(f.ledger.record_count(), 1);
    }

    #[tokio::test]
    async fn unsuccessful_transaction_is_rejected() {
        let gateway =
            MockPaystackGateway::with_transaction(transaction("ref_1", "abandoned", Some("vip")));
        let f = fixture(gateway);

        let result = f
            .handler
            .handle(ConfirmTransactionCommand {
                reference: "ref_1".to_string(),
            })
            .await;

        assert!(matches!(
            result,
            Err(BillingError::TransactionNotSuccessful { .. })
        ));
        assert_eq!(f.ledger.record_count(), 0);
    }

    #[tokio::test]
    async fn empty_reference_is_rejected() {
        let f = fixture(MockPaystackGateway::new());

        let result = f
            .handler
            .handle(ConfirmTransactionCommand {
                reference: String::new(),
            })
            .await;

        assert!(matches!(result, Err(BillingError::InvalidRequest { .. })));
    }

    #[tokio::test]
    async fn unknown_plan_redirects_to_base_dashboard() {
        let gateway =
            MockPaystackGateway::with_transaction(transaction("ref_1", "success", None));
        let f = fixture(gateway);

        let result = f
            .handler
            .handle(ConfirmTransactionCommand {
                reference: "ref_1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(result.plan, None);
        assert_eq!(result.redirect_path, "/dashboard");
        // Recorded but ledger-only.
        assert_eq!(f.ledger.record_count(), 1);
        assert_eq!(f.profiles.get("user-1").unwrap().role, Role::User);
    }

    #[tokio::test]
    async fn gateway_failure_propagates() {
        let f = fixture(MockPaystackGateway::new());

        let result = f
            .handler
            .handle(ConfirmTransactionCommand {
                reference: "ref_unknown".to_string(),
            })
            .await;

        assert!(matches!(result, Err(BillingError::Gateway { .. })));
    }
}
