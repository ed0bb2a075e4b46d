//! ToggleLifetimeHandler - operator grant/revoke of lifetime access.

use std::sync::Arc;

use serde_json::json;

use crate::domain::billing::BillingError;
use crate::ports::{AuditEntry, AuditLog, EntitlementPatch, ProfileStore, SubscriptionStore};

/// Command to set or clear a profile's lifetime flag by email.
#[derive(Debug, Clone)]
pub struct ToggleLifetimeCommand {
    pub email: String,
    pub set: bool,
}

/// Handler for the admin lifetime toggle.
///
/// This is the one path that may clear `lifetime`; the payment pipeline
/// itself only ever grants it.
pub struct ToggleLifetimeHandler {
    profiles: Arc<dyn ProfileStore>,
    subscriptions: Arc<dyn SubscriptionStore>,
    audit: Arc<dyn AuditLog>,
}

impl ToggleLifetimeHandler {
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

    pub async fn handle(&self, cmd: ToggleLifetimeCommand) -> Result<(), BillingError> {
        if cmd.email.is_empty() {
            return Err(BillingError::invalid_request("email", "required"));
        }
        let email = cmd.email.to_lowercase();

        if let Some(profile) = self.profiles.find_by_email(&email).await? {
            self.profiles
                .update_entitlement(
                    &profile.id,
                    EntitlementPatch {
                        role: None,
                        lifetime: Some(cmd.set),
                    },
                )
                .await?;
        } else {
            tracing::warn!(email = %email, "Lifetime toggle for email with no profile");
        }

        // Keep the derived subscription view in step with the toggle.
        if cmd.set {
            self.subscriptions.upsert_active(&email, "lifetime").await?;
        } else {
            self.subscriptions.revoke(&email, "lifetime").await?;
        }

        let entry = AuditEntry::new(
            "lifetime_toggle",
            json!({ "email": email, "set": cmd.set }),
        );
        if let Err(e) = self.audit.append(entry).await {
            tracing::warn!(error = %e, "Failed to append lifetime toggle audit entry");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryAuditLog, InMemoryProfileStore, InMemorySubscriptionStore,
    };
    use crate::domain::billing::{Role, SubscriptionStatus, UserProfile};
    use crate::domain::foundation::UserId;

    struct Fixture {
        profiles: Arc<InMemoryProfileStore>,
        subscriptions: Arc<InMemorySubscriptionStore>,
        handler: ToggleLifetimeHandler,
    }

    fn fixture(profiles: Vec<UserProfile>) -> Fixture {
        let profiles = Arc::new(InMemoryProfileStore::with_profiles(profiles));
        let subscriptions = Arc::new(InMemorySubscriptionStore::new());
        let handler = ToggleLifetimeHandler::new(
            profiles.clone(),
            subscriptions.clone(),
            Arc::new(InMemoryAuditLog::new()),
        );
        Fixture {
            profiles,
            subscriptions,
            handler,
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            id: UserId::new("user-1").unwrap(),
            email: "a@x.com".to_string(),
            role: Role::User,
            lifetime: false,
        }
    }

    #[tokio::test]
    async fn grants_lifetime_and_upserts_subscription() {
        let f = fixture(vec![profile()]);

        f.handler
            .handle(ToggleLifetimeCommand {
                email: "A@X.com".to_string(),
                set: true,
            })
            .await
            .unwrap();

        assert!(f.profiles.get("user-1").unwrap().lifetime);
        let subs = f.subscriptions.all();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].plan, "lifetime");
        assert_eq!(subs[0].status, SubscriptionStatus::Active);
    }

    #[tokio::test]
    async fn revokes_lifetime_and_subscription() {
        let f = fixture(vec![UserProfile {
            lifetime: true,
            ..profile()
        }]);
        f.subscriptions.upsert_active("a@x.com", "lifetime").await.unwrap();

        f.handler
            .handle(ToggleLifetimeCommand {
                email: "a@x.com".to_string(),
                set: false,
            })
            .await
            .unwrap();

        assert!(!f.profiles.get("user-1").unwrap().lifetime);
        assert_eq!(f.subscriptions.all()[0].status, SubscriptionStatus::Revoked);
    }

    #[tokio::test]
    async fn missing_profile_still_updates_subscription() {
        let f = fixture(vec![]);

        f.handler
            .handle(ToggleLifetimeCommand {
                email: "ghost@x.com".to_string(),
                set: true,
            })
            .await
            .unwrap();

        assert_eq!(f.subscriptions.all().len(), 1);
    }

    #[tokio::test]
    async fn empty_email_is_rejected() {
        let f = fixture(vec![]);

        let result = f
            .handler
            .handle(ToggleLifetimeCommand {
                email: String::new(),
                set: true,
            })
            .await;

        assert!(matches!(result, Err(BillingError::InvalidRequest { .. })));
    }
}
