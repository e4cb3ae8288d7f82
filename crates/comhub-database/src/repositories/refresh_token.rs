//! Postgres refresh token store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use comhub_core::result::AppResult;
use comhub_core::traits::token_store::{
    NewRefreshToken, RefreshTokenRecord, RefreshTokenStore, RotationOutcome,
};
use comhub_entity::token::RefreshToken;

use crate::query::db_error;

/// Refresh tokens persisted in `refresh_tokens`.
#[derive(Debug, Clone)]
pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    /// Create a new refresh token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active tokens of a user, newest first.
    pub async fn list_active_for_user(&self, user_id: Uuid) -> AppResult<Vec<RefreshToken>> {
        sqlx::query_as::<_, RefreshToken>(
            "SELECT * FROM refresh_tokens \
             WHERE user_id = $1 AND revoked_at IS NULL AND expires_at > NOW() \
             ORDER BY issued_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list refresh tokens"))
    }
}

const INSERT_SQL: &str = "INSERT INTO refresh_tokens \
    (id, user_id, family_id, token_hash, issued_at, expires_at, user_agent, ip_address) \
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *";

#[async_trait]
impl RefreshTokenStore for RefreshTokenRepository {
    async fn insert(&self, token: NewRefreshToken) -> AppResult<RefreshTokenRecord> {
        let row = sqlx::query_as::<_, RefreshToken>(INSERT_SQL)
            .bind(token.id)
            .bind(token.user_id)
            .bind(token.family_id)
            .bind(&token.token_hash)
            .bind(token.issued_at)
            .bind(token.expires_at)
            .bind(&token.user_agent)
            .bind(&token.ip_address)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to store refresh token"))?;
        Ok(row.into())
    }

    async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<RefreshTokenRecord>> {
        let row =
            sqlx::query_as::<_, RefreshToken>("SELECT * FROM refresh_tokens WHERE token_hash = $1")
                .bind(token_hash)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to find refresh token"))?;
        Ok(row.map(Into::into))
    }

    async fn rotate(
        &self,
        presented_hash: &str,
        successor: NewRefreshToken,
        now: DateTime<Utc>,
    ) -> AppResult<RotationOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        // Row lock serialises concurrent rotations of the same token.
        let current = sqlx::query_as::<_, RefreshToken>(
            "SELECT * FROM refresh_tokens WHERE token_hash = $1 FOR UPDATE",
        )
        .bind(presented_hash)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock refresh token"))?;

        let Some(current) = current else {
            return Ok(RotationOutcome::Unknown);
        };
        if current.revoked_at.is_some() {
            return Ok(RotationOutcome::Revoked(current.into()));
        }
        if current.expires_at <= now {
            return Ok(RotationOutcome::Expired(current.into()));
        }

        sqlx::query("UPDATE refresh_tokens SET revoked_at = $2 WHERE id = $1")
            .bind(current.id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to revoke refresh token"))?;

        let next = sqlx::query_as::<_, RefreshToken>(INSERT_SQL)
            .bind(successor.id)
            .bind(current.user_id)
            .bind(current.family_id)
            .bind(&successor.token_hash)
            .bind(successor.issued_at)
            .bind(successor.expires_at)
            .bind(&successor.user_agent)
            .bind(&successor.ip_address)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to store rotated refresh token"))?;

        let previous = sqlx::query_as::<_, RefreshToken>(
            "UPDATE refresh_tokens SET replaced_by = $2 WHERE id = $1 RETURNING *",
        )
        .bind(current.id)
        .bind(next.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to link rotated refresh token"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit refresh token rotation"))?;

        debug!(family_id = %previous.family_id, "Refresh token rotated");
        Ok(RotationOutcome::Rotated {
            previous: previous.into(),
            successor: next.into(),
        })
    }

    async fn revoke_family(&self, family_id: Uuid, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = $2 \
             WHERE family_id = $1 AND revoked_at IS NULL",
        )
        .bind(family_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to revoke token family"))?;
        Ok(result.rows_affected())
    }

    async fn revoke_all_for_user(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = $2 \
             WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to revoke user tokens"))?;
        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete expired refresh tokens"))?;
        Ok(result.rows_affected())
    }
}
