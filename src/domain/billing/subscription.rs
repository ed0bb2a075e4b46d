//! Subscription rows tracked alongside one-off payments.
//!
//! Subscriptions are a derived, eventually-consistent view. They are written
//! best-effort when entitlements apply and reconciled in bulk by the sync
//! dispatcher; they are never transactionally tied to ledger writes.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Lifecycle state of a subscription row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Revoked,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Revoked => "revoked",
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Plan state for one purchaser email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Purchaser email, lower-cased. Together with `plan` identifies the row.
    pub email: String,

    /// Plan name as recorded at purchase time.
    pub plan: String,

    pub status: SubscriptionStatus,

    pub started_at: Timestamp,
}

impl Subscription {
    /// Creates a new active subscription starting now.
    pub fn active(email: impl Into<String>, plan: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            plan: plan.into(),
            status: SubscriptionStatus::Active,
            started_at: Timestamp::now(),
        }
    }
}
