//! PaymentLedger port - Append-only payment store with idempotent inserts.
//!
//! The ledger is the source of truth for "did we see this payment",
//! decoupled from "did we grant access". Raw events are appended
//! unconditionally for audit; records are keyed uniquely by the gateway
//! reference.
//!
//! ## Why Idempotency Matters
//!
//! The gateway delivers at-least-once: network timeouts, 5xx responses from
//! our endpoint, and handler crashes all trigger redelivery, and two
//! deliveries of the same reference may race each other on horizontally
//! scaled instances. The unique-key insert below is the only concurrency
//! control the pipeline relies on.

use async_trait::async_trait;

use crate::domain::billing::{PaymentEvent, PaymentRecord};
use crate::domain::foundation::DomainError;

/// Result of attempting to insert a payment record.
///
/// The duplicate case is a named outcome rather than a caught storage
/// exception so the at-least-once tolerance boundary is visible in the
/// interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Record was inserted (first delivery of this reference).
    Inserted,
    /// A record with this reference already exists; nothing was written.
    DuplicateSkipped,
}

/// Port for the payment ledger.
#[async_trait]
pub trait PaymentLedger: Send + Sync {
    /// Appends the raw event for audit.
    ///
    /// Called before entitlement processing so the event survives even if
    /// later stages fail. Append-only; every delivery is kept, duplicates
    /// included.
    async fn append_event(&self, event: &PaymentEvent) -> Result<(), DomainError>;

    /// Inserts a payment record keyed by its reference.
    ///
    /// Implementations must make the duplicate check and the insert
    /// effectively atomic (`ON CONFLICT DO NOTHING` or an equivalent
    /// compare-and-swap) so concurrent deliveries of the same reference
    /// cannot both insert. The existing record is never modified.
    async fn insert_record(&self, record: &PaymentRecord) -> Result<InsertOutcome, DomainError>;

    /// Finds a record by its gateway reference.
    async fn find_record(&self, reference: &str) -> Result<Option<PaymentRecord>, DomainError>;

    /// Lists the most recent records, newest first.
    async fn list_recent_records(&self, limit: u32) -> Result<Vec<PaymentRecord>, DomainError>;
}
