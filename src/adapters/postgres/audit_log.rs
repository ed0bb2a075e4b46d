//! PostgreSQL adapter for AuditLog.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::DomainError;
use crate::ports::{AuditEntry, AuditLog};

/// PostgreSQL implementation of the audit log.
pub struct PgAuditLog {
    pool: PgPool,
}

impl PgAuditLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLog for PgAuditLog {
    async fn append(&self, entry: AuditEntry) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO audit_log (event, payload, created_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&entry.event)
        .bind(&entry.payload)
        .bind(entry.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to append audit entry: {}", e)))?;

        Ok(())
    }
}
