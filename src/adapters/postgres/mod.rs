//! PostgreSQL adapters for the storage ports.

mod audit_log;
mod ledger;
mod profile_store;
mod subscription_store;

pub use audit_log::PgAuditLog;
pub use ledger::PgPaymentLedger;
pub use profile_store::PgProfileStore;
pub use subscription_store::PgSubscriptionStore;
