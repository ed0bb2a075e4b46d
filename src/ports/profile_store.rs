//! ProfileStore port - Interface to the hosted identity/profile store.
//!
//! The reconciliation pipeline never creates or deletes profiles; it only
//! reads them and patches the two entitlement fields (`role`, `lifetime`).

use async_trait::async_trait;

use crate::domain::billing::{EntitlementChange, Role, UserProfile};
use crate::domain::foundation::{DomainError, UserId};

/// Patch of entitlement fields to apply to a profile.
///
/// Fields left `None` are untouched. Patches derived from plan entitlements
/// only ever set `lifetime` to `true`; operator toggles may clear it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitlementPatch {
    pub role: Option<Role>,
    pub lifetime: Option<bool>,
}

impl EntitlementPatch {
    /// Builds the patch for a plan entitlement.
    pub fn from_change(change: &EntitlementChange) -> Self {
        match change {
            EntitlementChange::SetRole(role) => Self {
                role: Some(*role),
                lifetime: None,
            },
            EntitlementChange::GrantLifetime => Self {
                role: None,
                lifetime: Some(true),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.role.is_none() && self.lifetime.is_none()
    }
}

/// Port for profile lookup and entitlement writes.
///
/// Implementations must make `update_entitlement` idempotent: applying the
/// same patch twice leaves the profile in the same state as applying it
/// once. That, together with the ledger's unique-reference constraint, is
/// the pipeline's entire concurrency discipline.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Looks up a profile by its identity-provider id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, DomainError>;

    /// Looks up a profile by lower-cased email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, DomainError>;

    /// Applies an entitlement patch to the profile with the given id.
    async fn update_entitlement(
        &self,
        id: &UserId,
        patch: EntitlementPatch,
    ) -> Result<(), DomainError>;
}
