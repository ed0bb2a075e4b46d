//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between the
//! domain and the outside world. Adapters implement these ports, and every
//! pipeline component receives its ports by injection so tests can
//! substitute in-memory fakes.
//!
//! ## Storage Ports
//!
//! - `ProfileStore` - Profile lookup and entitlement writes
//! - `PaymentLedger` - Append-only event audit plus idempotent record inserts
//! - `SubscriptionStore` - Derived subscription view
//! - `AuditLog` - Operator-visible audit trail
//!
//! ## Gateway Ports
//!
//! - `PaymentGateway` - Outbound checkout initialization and transaction
//!   verification

mod audit_log;
mod payment_gateway;
mod payment_ledger;
mod profile_store;
mod subscription_store;

pub use audit_log::{AuditEntry, AuditLog};
pub use payment_gateway::{
    CheckoutIntent, GatewayError, GatewayErrorCode, GatewayTransaction, InitializeCheckoutRequest,
    PaymentGateway,
};
pub use payment_ledger::{InsertOutcome, PaymentLedger};
pub use profile_store::{EntitlementPatch, ProfileStore};
pub use subscription_store::SubscriptionStore;
