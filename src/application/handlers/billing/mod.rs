//! Billing handlers - the reconciliation pipeline stages.
//!
//! - `ProcessWebhookHandler` - push path: verify, normalize, record, entitle
//! - `ConfirmTransactionHandler` - pull path: gateway verify, record, entitle
//! - `ApplyEntitlementHandler` - shared entitlement updater
//! - `StartCheckoutHandler` - checkout initialization
//! - `SyncEntitlementsHandler` - admin bulk drift correction
//! - `ToggleLifetimeHandler` - admin lifetime grant/revoke

mod apply_entitlement;
mod confirm_transaction;
mod process_webhook;
mod start_checkout;
mod sync_entitlements;
mod toggle_lifetime;

pub use apply_entitlement::ApplyEntitlementHandler;
pub use confirm_transaction::{
    ConfirmTransactionCommand, ConfirmTransactionHandler, ConfirmTransactionResult,
};
pub use process_webhook::{ProcessWebhookCommand, ProcessWebhookHandler, ProcessWebhookResult};
pub use start_checkout::{StartCheckoutCommand, StartCheckoutHandler};
pub use sync_entitlements::{SyncEntitlementsHandler, SyncReport};
pub use toggle_lifetime::{ToggleLifetimeCommand, ToggleLifetimeHandler};
