//! PostgreSQL adapter for SubscriptionStore.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::billing::{Subscription, SubscriptionStatus};
use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::SubscriptionStore;

/// PostgreSQL implementation of the subscription store.
pub struct PgSubscriptionStore {
    pool: PgPool,
}

impl PgSubscriptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for PgSubscriptionStore {
    async fn list_active(&self) -> Result<Vec<Subscription>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT email, plan, started_at
            FROM subscriptions
            WHERE status = 'active'
            ORDER BY started_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list subscriptions: {}", e)))?;

        Ok(rows
            .iter()
            .map(|row| Subscription {
                email: row.get("email"),
                plan: row.get("plan"),
                status: SubscriptionStatus::Active,
                started_at: Timestamp::from_datetime(row.get("started_at")),
            })
            .collect())
    }

    async fn upsert_active(&self, email: &str, plan: &str) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (email, plan, status, started_at)
            VALUES ($1, $2, 'active', now())
            ON CONFLICT (email, plan) DO UPDATE SET status = 'active'
            "#,
        )
        .bind(email)
        .bind(plan)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to upsert subscription: {}", e)))?;

        Ok(())
    }

    async fn revoke(&self, email: &str, plan: &str) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = 'revoked'
            WHERE email = $1 AND plan = $2
            "#,
        )
        .bind(email)
        .bind(plan)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to revoke subscription: {}", e)))?;

        Ok(())
    }
}
