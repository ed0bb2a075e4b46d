//! PostgreSQL adapter for ProfileStore.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::billing::{Role, UserProfile};
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{EntitlementPatch, ProfileStore};

/// PostgreSQL implementation of the profile store.
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn profile_from_row(row: &sqlx::postgres::PgRow) -> Result<UserProfile, DomainError> {
        let id: String = row.get("id");
        let role: String = row.get("role");

        Ok(UserProfile {
            id: UserId::new(id)
                .map_err(|e| DomainError::new(ErrorCode::InternalError, e.to_string()))?,
            email: row.get("email"),
            role: Role::parse(&role),
            lifetime: row.get("lifetime"),
        })
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, role, lifetime
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find profile by id: {}", e)))?;

        row.as_ref().map(Self::profile_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, role, lifetime
            FROM profiles
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find profile by email: {}", e)))?;

        row.as_ref().map(Self::profile_from_row).transpose()
    }

    async fn update_entitlement(
        &self,
        id: &UserId,
        patch: EntitlementPatch,
    ) -> Result<(), DomainError> {
        if patch.is_empty() {
            return Ok(());
        }

        // COALESCE keeps fields the patch leaves unset; repeating the same
        // patch is a no-op write, which keeps profile updates idempotent.
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET role = COALESCE($2, role),
                lifetime = COALESCE($3, lifetime)
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(patch.role.map(|r| r.as_str()))
        .bind(patch.lifetime)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update entitlement: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::ProfileNotFound, id.to_string()));
        }
        Ok(())
    }
}
