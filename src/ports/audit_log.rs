//! AuditLog port - Operator-visible audit trail.
//!
//! Every attempted entitlement application (including deferrals) and every
//! admin sync action writes one entry here, so operators can reconstruct
//! what the pipeline did for any payment reference.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp};

/// One audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    /// Short event name, e.g. `entitlement_applied` or `bulk_entitlement_sync`.
    pub event: String,

    /// Structured details (reference, outcome, counts).
    pub payload: serde_json::Value,

    pub created_at: Timestamp,
}

impl AuditEntry {
    /// Creates an entry timestamped now.
    pub fn new(event: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            payload,
            created_at: Timestamp::now(),
        }
    }
}

/// Port for appending audit entries.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, entry: AuditEntry) -> Result<(), DomainError>;
}
