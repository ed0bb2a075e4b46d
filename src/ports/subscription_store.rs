//! SubscriptionStore port - Derived subscription view.

use async_trait::async_trait;

use crate::domain::billing::Subscription;
use crate::domain::foundation::DomainError;

/// Port for the subscription table.
///
/// Rows are identified by `(email, plan)`. The table is an
/// eventually-consistent view used by the bulk sync; it is written
/// best-effort and never participates in ledger transactions.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Lists all subscriptions with `active` status.
    async fn list_active(&self) -> Result<Vec<Subscription>, DomainError>;

    /// Inserts or reactivates the `(email, plan)` subscription row.
    async fn upsert_active(&self, email: &str, plan: &str) -> Result<(), DomainError>;

    /// Marks the `(email, plan)` subscription row as revoked.
    ///
    /// A missing row is not an error.
    async fn revoke(&self, email: &str, plan: &str) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn SubscriptionStore) {}
    }
}
