//! ApplyEntitlementHandler - maps a recorded payment to a profile mutation.

use std::sync::Arc;

use serde_json::json;

use crate::domain::billing::{EntitlementResult, PaymentRecord, PaymentStatus, Plan, SkipReason};
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::{AuditEntry, AuditLog, EntitlementPatch, ProfileStore, SubscriptionStore};

/// Applies the entitlement a successful payment grants.
///
/// Both delivery paths (webhook push and redirect pull) and the admin sync
/// converge on the plan-to-entitlement mapping used here. Application is
/// monotonic-safe: re-applying a granted entitlement changes nothing, which
/// backstops any idempotence gap upstream.
pub struct ApplyEntitlementHandler {
    profiles: Arc<dyn ProfileStore>,
    subscriptions: Arc<dyn SubscriptionStore>,
    audit: Arc<dyn AuditLog>,
}

impl ApplyEntitlementHandler {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            profiles,
            subscriptions,
            audit,
        }
    }

    /// Applies the entitlement for one payment record.
    ///
    /// Returns `Skipped` for non-success records and null/unrecognized
    /// plans, `DeferredNoProfile` when neither the metadata user id nor the
    /// customer email resolves to a profile. Every attempt, deferrals
    /// included, writes one audit entry.
    pub async fn handle(&self, record: &PaymentRecord) -> Result<EntitlementResult, DomainError> {
        let result = self.apply(record).await?;

        self.append_audit(record, &result).await;

        match &result {
            EntitlementResult::Applied {
                user_id, changed, ..
            } => {
                tracing::info!(
                    reference = %record.reference,
                    user_id = %user_id,
                    changed = changed,
                    "Entitlement applied"
                );
            }
            EntitlementResult::Skipped(reason) => {
                tracing::debug!(
                    reference = %record.reference,
                    reason = %reason,
                    "Entitlement skipped"
                );
            }
            EntitlementResult::DeferredNoProfile => {
                // Elevated severity: payment is recorded but nobody was
                // credited. Requires operator follow-up.
                tracing::warn!(
                    reference = %record.reference,
                    email = record.customer_email.as_deref().unwrap_or(""),
                    "Payment recorded but no matching profile; entitlement deferred"
                );
            }
        }

        Ok(result)
    }

    async fn apply(&self, record: &PaymentRecord) -> Result<EntitlementResult, DomainError> {
        if record.status != PaymentStatus::Success {
            return Ok(EntitlementResult::Skipped(SkipReason::NotSuccessful));
        }

        let Some(hint) = record.plan.as_deref() else {
            return Ok(EntitlementResult::Skipped(SkipReason::NoPlan));
        };
        let Some(plan) = Plan::parse(hint) else {
            return Ok(EntitlementResult::Skipped(SkipReason::UnknownPlan(
                hint.to_string(),
            )));
        };

        let Some(mut profile) = self.resolve_profile(record).await? else {
            return Ok(EntitlementResult::DeferredNoProfile);
        };

        let change = plan.entitlement();
        let changed = profile.apply(&change);
        if changed {
            self.profiles
                .update_entitlement(&profile.id, EntitlementPatch::from_change(&change))
                .await?;
        }

        // Best-effort subscription upsert; the subscription table is a
        // derived view and never blocks crediting the profile.
        let email = record
            .customer_email
            .as_deref()
            .unwrap_or(profile.email.as_str());
        if !email.is_empty() {
            if let Err(e) = self.subscriptions.upsert_active(email, plan.as_str()).await {
                tracing::warn!(
                    reference = %record.reference,
                    error = %e,
                    "Failed to upsert subscription row"
                );
            }
        }

        Ok(EntitlementResult::Applied {
            user_id: profile.id,
            change,
            changed,
        })
    }

    /// Resolves the target profile: metadata user id first, then email.
    async fn resolve_profile(
        &self,
        record: &PaymentRecord,
    ) -> Result<Option<crate::domain::billing::UserProfile>, DomainError> {
        if let Some(hint) = record.user_id_hint.as_deref() {
            if let Ok(user_id) = UserId::new(hint) {
                if let Some(profile) = self.profiles.find_by_id(&user_id).await? {
                    return Ok(Some(profile));
                }
            }
        }

        if let Some(email) = record.customer_email.as_deref() {
            return self.profiles.find_by_email(email).await;
        }

        Ok(None)
    }

    async fn append_audit(&self, record: &PaymentRecord, result: &EntitlementResult) {
        let entry = AuditEntry::new(
            "entitlement_attempt",
            json!({
                "reference": record.reference,
                "plan": record.plan,
                "outcome": result.outcome(),
            }),
        );
        // The audit trail is operator-visibility, not correctness; a failed
        // append must not fail the payment.
        if let Err(e) = self.audit.append(entry).await {
            tracing::warn!(
                reference = %record.reference,
                error = %e,
                "Failed to append audit entry"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryAuditLog, InMemoryProfileStore, InMemorySubscriptionStore};
    use crate::domain::billing::{EntitlementChange, Role, UserProfile};
    use crate::domain::foundation::Timestamp;

    fn record(plan: Option<&str>, email: Option<&str>, user_id: Option<&str>) -> PaymentRecord {
        PaymentRecord {
            reference: "ref_1".to_string(),
            amount_minor_units: 500_000,
            plan: plan.map(str::to_string),
            status: PaymentStatus::Success,
            customer_email: email.map(str::to_string),
            user_id_hint: user_id.map(str::to_string),
            received_at: Timestamp::now(),
        }
    }

    fn profile(id: &str, email: &str) -> UserProfile {
        UserProfile {
            id: UserId::new(id).unwrap(),
            email: email.to_string(),
            role: Role::User,
            lifetime: false,
        }
    }

    struct Fixture {
        profiles: Arc<InMemoryProfileStore>,
        subscriptions: Arc<InMemorySubscriptionStore>,
        audit: Arc<InMemoryAuditLog>,
        handler: ApplyEntitlementHandler,
    }

    fn fixture_with(profiles: Vec<UserProfile>) -> Fixture {
        let profiles = Arc::new(InMemoryProfileStore::with_profiles(profiles));
        let subscriptions = Arc::new(InMemorySubscriptionStore::new());
        let audit = Arc::new(InMemoryAuditLog::new());
        let handler = ApplyEntitlementHandler::new(
            profiles.clone(),
            subscriptions.clone(),
            audit.clone(),
        );
        Fixture {
            profiles,
            subscriptions,
            audit,
            handler,
        }
    }

    #[tokio::test]
    async fn vip_plan_sets_vip_role() {
        let f = fixture_with(vec![profile("user-1", "a@x.com")]);

        let result = f
            .handler
            .handle(&record(Some("vip"), Some("a@x.com"), None))
            .await
            .unwrap();

        assert!(matches!(
            result,
            EntitlementResult::Applied {
                change: EntitlementChange::SetRole(Role::Vip),
                changed: true,
                ..
            }
        ));
        let stored = f.profiles.get("user-1").unwrap();
        assert_eq!(stored.role, Role::Vip);
    }

    #[tokio::test]
    async fn lifetime_plan_sets_lifetime_flag() {
        let f = fixture_with(vec![profile("user-1", "a@x.com")]);

        f.handler
            .handle(&record(Some("lifetime"), Some("a@x.com"), None))
            .await
            .unwrap();

        let stored = f.profiles.get("user-1").unwrap();
        assert!(stored.lifetime);
        assert_eq!(stored.role, Role::User);
    }

    #[tokio::test]
    async fn reapplying_lifetime_is_a_noop_not_a_toggle() {
        let f = fixture_with(vec![profile("user-1", "a@x.com")]);
        let rec = record(Some("lifetime"), Some("a@x.com"), None);

        f.handler.handle(&rec).await.unwrap();
        let second = f.handler.handle(&rec).await.unwrap();

        assert!(matches!(
            second,
            EntitlementResult::Applied { changed: false, .. }
        ));
        assert!(f.profiles.get("user-1").unwrap().lifetime);
    }

    #[tokio::test]
    async fn user_id_hint_takes_precedence_over_email() {
        let f = fixture_with(vec![
            profile("user-1", "a@x.com"),
            profile("user-2", "b@x.com"),
        ]);

        // Email points at user-1 but the metadata user id wins.
        f.handler
            .handle(&record(Some("vip"), Some("a@x.com"), Some("user-2")))
            .await
            .unwrap();

        assert_eq!(f.profiles.get("user-2").unwrap().role, Role::Vip);
        assert_eq!(f.profiles.get("user-1").unwrap().role, Role::User);
    }

    #[tokio::test]
    async fn unresolvable_user_id_falls_back_to_email() {
        let f = fixture_with(vec![profile("user-1", "a@x.com")]);

        let result = f
            .handler
            .handle(&record(Some("vip"), Some("a@x.com"), Some("ghost")))
            .await
            .unwrap();

        assert!(matches!(result, EntitlementResult::Applied { .. }));
        assert_eq!(f.profiles.get("user-1").unwrap().role, Role::Vip);
    }

    #[tokio::test]
    async fn no_resolvable_profile_defers() {
        let f = fixture_with(vec![]);

        let result = f
            .handler
            .handle(&record(Some("vip"), Some("nobody@x.com"), None))
            .await
            .unwrap();

        assert_eq!(result, EntitlementResult::DeferredNoProfile);
    }

    #[tokio::test]
    async fn missing_email_and_user_id_defers() {
        let f = fixture_with(vec![profile("user-1", "a@x.com")]);

        let result = f
            .handler
            .handle(&record(Some("vip"), None, None))
            .await
            .unwrap();

        assert_eq!(result, EntitlementResult::DeferredNoProfile);
    }

    #[tokio::test]
    async fn non_success_record_is_skipped() {
        let f = fixture_with(vec![profile("user-1", "a@x.com")]);
        let mut rec = record(Some("vip"), Some("a@x.com"), None);
        rec.status = PaymentStatus::Failed;

        let result = f.handler.handle(&rec).await.unwrap();

        assert_eq!(
            result,
            EntitlementResult::Skipped(SkipReason::NotSuccessful)
        );
        assert_eq!(f.profiles.get("user-1").unwrap().role, Role::User);
    }

    #[tokio::test]
    async fn missing_plan_is_ledger_only() {
        let f = fixture_with(vec![profile("user-1", "a@x.com")]);

        let result = f
            .handler
            .handle(&record(None, Some("a@x.com"), None))
            .await
            .unwrap();

        assert_eq!(result, EntitlementResult::Skipped(SkipReason::NoPlan));
    }

    #[tokio::test]
    async fn unknown_plan_mutates_nothing() {
        let f = fixture_with(vec![profile("user-1", "a@x.com")]);

        let result = f
            .handler
            .handle(&record(Some("unknown_tier"), Some("a@x.com"), None))
            .await
            .unwrap();

        assert!(matches!(
            result,
            EntitlementResult::Skipped(SkipReason::UnknownPlan(_))
        ));
        let stored = f.profiles.get("user-1").unwrap();
        assert_eq!(stored.role, Role::User);
        assert!(!stored.lifetime);
    }

    #[tokio::test]
    async fn applied_entitlement_upserts_subscription() {
        let f = fixture_with(vec![profile("user-1", "a@x.com")]);

        f.handler
            .handle(&record(Some("vip"), Some("a@x.com"), None))
            .await
            .unwrap();

        let subs = f.subscriptions.all();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].email, "a@x.com");
        assert_eq!(subs[0].plan, "vip");
    }

    #[tokio::test]
    async fn every_attempt_writes_an_audit_entry() {
        let f = fixture_with(vec![profile("user-1", "a@x.com")]);

        f.handler
            .handle(&record(Some("vip"), Some("a@x.com"), None))
            .await
            .unwrap();
        f.handler
            .handle(&record(Some("vip"), Some("nobody@x.com"), None))
            .await
            .unwrap();
        f.handler
            .handle(&record(None, Some("a@x.com"), None))
            .await
            .unwrap();

        let entries = f.audit.entries();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.event == "entitlement_attempt"));
        let outcomes: Vec<_> = entries
            .iter()
            .map(|e| e.payload["outcome"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(outcomes, vec!["applied", "deferred_no_profile", "skipped"]);
    }
}
