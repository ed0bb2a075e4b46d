//! SyncEntitlementsHandler - admin-triggered drift correction.
//!
//! Walks the active-subscription table and re-applies the same plan
//! entitlement mapping the payment pipeline uses. Each row is independent:
//! a missing profile or a failed row never aborts the remaining rows, and a
//! crash mid-batch leaves a resumable state because every write is
//! monotonic.

use std::sync::Arc;

use serde_json::json;

use crate::domain::billing::{BillingError, EntitlementResult, Plan};
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::{AuditEntry, AuditLog, EntitlementPatch, ProfileStore, SubscriptionStore};

/// Counts reported by a bulk sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    /// Active subscription rows walked.
    pub processed: u32,
    /// Rows that resolved to a profile and were re-applied.
    pub synced: u32,
}

/// Handler for bulk and single-user entitlement sync.
pub struct SyncEntitlementsHandler {
    subscriptions: Arc<dyn SubscriptionStore>,
    profiles: Arc<dyn ProfileStore>,
    audit: Arc<dyn AuditLog>,
}

impl SyncEntitlementsHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionStore>,
        profiles: Arc<dyn ProfileStore>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            subscriptions,
            profiles,
            audit,
        }
    }

    /// Re-applies entitlements for every active subscription.
    ///
    /// Per-row failures are logged and skipped; only a failure to read the
    /// subscription table itself aborts the batch.
    pub async fn sync_all(&self) -> Result<SyncReport, DomainError> {
        let subscriptions = self.subscriptions.list_active().await?;

        let mut processed: u32 = 0;
        let mut synced: u32 = 0;

        for sub in subscriptions {
            processed += 1;

            let Some(plan) = Plan::parse(&sub.plan) else {
                tracing::warn!(email = %sub.email, plan = %sub.plan, "Skipping subscription with unrecognized plan");
                continue;
            };

            match self.profiles.find_by_email(&sub.email).await {
                Ok(Some(mut profile)) => {
                    let change = plan.entitlement();
                    if profile.apply(&change) {
                        if let Err(e) = self
                            .profiles
                            .update_entitlement(&profile.id, EntitlementPatch::from_change(&change))
                            .await
                        {
                            tracing::warn!(
                                email = %sub.email,
                                error = %e,
                                "Failed to sync subscription row"
                            );
                            continue;
                        }
                    }
                    synced += 1;
                }
                Ok(None) => {
                    tracing::debug!(email = %sub.email, "No profile for subscription; skipped");
                }
                Err(e) => {
                    tracing::warn!(
                        email = %sub.email,
                        error = %e,
                        "Profile lookup failed for subscription row"
                    );
                }
            }
        }

        let entry = AuditEntry::new(
            "bulk_entitlement_sync",
            json!({ "processed": processed, "synced": synced }),
        );
        if let Err(e) = self.audit.append(entry).await {
            tracing::warn!(error = %e, "Failed to append bulk sync audit entry");
        }

        tracing::info!(processed, synced, "Bulk entitlement sync complete");
        Ok(SyncReport { processed, synced })
    }

    /// Re-applies one user's entitlement for the given tier.
    pub async fn sync_one(
        &self,
        user_id: &UserId,
        tier: &str,
    ) -> Result<EntitlementResult, BillingError> {
        let plan = Plan::parse(tier).ok_or_else(|| BillingError::unknown_plan(tier))?;

        let Some(mut profile) = self.profiles.find_by_id(user_id).await? else {
            tracing::warn!(user_id = %user_id, "Profile not found for admin sync");
            return Ok(EntitlementResult::DeferredNoProfile);
        };

        let change = plan.entitlement();
        let changed = profile.apply(&change);
        if changed {
            self.profiles
                .update_entitlement(&profile.id, EntitlementPatch::from_change(&change))
                .await?;
        }

        let entry = AuditEntry::new(
            "entitlement_sync",
            json!({
                "admin_sync": true,
                "user_id": user_id.as_str(),
                "tier": plan.as_str(),
            }),
        );
        if let Err(e) = self.audit.append(entry).await {
            tracing::warn!(error = %e, "Failed to append sync audit entry");
        }

        Ok(EntitlementResult::Applied {
            user_id: profile.id,
            change,
            changed,
        })
    }
}
