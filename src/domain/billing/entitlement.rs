//! Entitlement changes and application outcomes.

use super::profile::Role;
use crate::domain::foundation::UserId;

/// The profile mutation a successful payment grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntitlementChange {
    /// Set the profile role to the plan's role.
    SetRole(Role),

    /// Set the lifetime-access flag. Never unset by the pipeline.
    GrantLifetime,
}

/// Why an entitlement application was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The payment record is not in `success` status.
    NotSuccessful,

    /// The record carries no plan metadata; ledger-only payment.
    NoPlan,

    /// The plan hint did not match any recognized plan.
    UnknownPlan(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NotSuccessful => write!(f, "payment not successful"),
            SkipReason::NoPlan => write!(f, "no plan metadata"),
            SkipReason::UnknownPlan(hint) => write!(f, "unrecognized plan '{}'", hint),
        }
    }
}

/// Outcome of one entitlement application attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntitlementResult {
    /// Entitlement applied to a resolved profile.
    ///
    /// `changed` is false when the profile already held the entitlement
    /// (duplicate or re-sync), which is a harmless no-op.
    Applied {
        user_id: UserId,
        change: EntitlementChange,
        changed: bool,
    },

    /// Nothing to apply for this record.
    Skipped(SkipReason),

    /// The payment is recorded but no profile could be resolved from the
    /// event metadata. Surfaced to operators; not retried automatically.
    DeferredNoProfile,
}

impl EntitlementResult {
    /// Short outcome label used in audit entries and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            EntitlementResult::Applied { changed: true, .. } => "applied",
            EntitlementResult::Applied { changed: false, .. } => "already_applied",
            EntitlementResult::Skipped(_) => "skipped",
            EntitlementResult::DeferredNoProfile => "deferred_no_profile",
        }
    }
}
