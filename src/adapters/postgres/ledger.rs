//! PostgreSQL adapter for PaymentLedger.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::billing::{PaymentEvent, PaymentRecord, PaymentStatus};
use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::{InsertOutcome, PaymentLedger};

/// PostgreSQL implementation of the payment ledger.
///
/// The `payments.reference` primary key makes `insert_record` atomic under
/// concurrent deliveries: `ON CONFLICT DO NOTHING` reports zero affected
/// rows for the loser of the race.
pub struct PgPaymentLedger {
    pool: PgPool,
}

impl PgPaymentLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn record_from_row(row: &sqlx::postgres::PgRow) -> PaymentRecord {
        let status: String = row.get("status");
        PaymentRecord {
            reference: row.get("reference"),
            amount_minor_units: row.get("amount"),
            plan: row.get("plan"),
            status: PaymentStatus::parse(&status),
            customer_email: row.get("customer_email"),
            user_id_hint: row.get("user_id"),
            received_at: Timestamp::from_datetime(row.get("received_at")),
        }
    }
}

#[async_trait]
impl PaymentLedger for PgPaymentLedger {
    async fn append_event(&self, event: &PaymentEvent) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payment_events (event, reference, payload, received_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&event.raw_kind)
        .bind(&event.reference)
        .bind(&event.raw)
        .bind(event.received_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to append payment event: {}", e)))?;

        Ok(())
    }

    async fn insert_record(&self, record: &PaymentRecord) -> Result<InsertOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO payments
                (reference, amount, plan, status, customer_email, user_id, received_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (reference) DO NOTHING
            "#,
        )
        .bind(&record.reference)
        .bind(record.amount_minor_units)
        .bind(&record.plan)
        .bind(record.status.as_str())
        .bind(&record.customer_email)
        .bind(&record.user_id_hint)
        .bind(record.received_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert payment record: {}", e)))?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::DuplicateSkipped)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    async fn find_record(&self, reference: &str) -> Result<Option<PaymentRecord>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT reference, amount, plan, status, customer_email, user_id, received_at
            FROM payments
            WHERE reference = $1
            "#,
        )
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find payment record: {}", e)))?;

        Ok(row.as_ref().map(Self::record_from_row))
    }

    async fn list_recent_records(&self, limit: u32) -> Result<Vec<PaymentRecord>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT reference, amount, plan, status, customer_email, user_id, received_at
            FROM payments
            ORDER BY received_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list payment records: {}", e)))?;

        Ok(rows.iter().map(Self::record_from_row).collect())
    }
}
