//! PostgreSQL Repository Implementations

use auth::UserId;
use sqlx::PgPool;

use crate::domain::audit_log::AuditLogEntry;
use crate::domain::repository::SoftDeleteRepository;
use crate::error::AuditResult;

/// PostgreSQL-backed repository
#[derive(Clone)]
pub struct PgAuditRepository {
    pool: PgPool,
}

impl PgAuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SoftDeleteRepository for PgAuditRepository {
    async fn soft_delete_user(&self, target: &UserId, entry: &AuditLogEntry) -> AuditResult<bool> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE users
            SET deleted_at = $2
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(target.as_str())
        .bind(entry.created_at)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            tx.rollback().await?;
            tracing::warn!(target_id = %target, "Soft delete matched no live user");
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                audit_log_id,
                actor_id,
                target_id,
                target_type,
                action,
                metadata,
                ip_address,
                user_agent,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(entry.id.into_uuid())
        .bind(entry.actor_id.as_str())
        .bind(&entry.target_id)
        .bind(&entry.target_type)
        .bind(&entry.action)
        .bind(entry.metadata_json())
        .bind(entry.ip_address.as_deref())
        .bind(entry.user_agent.as_deref())
        .bind(entry.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            audit_log_id = %entry.id,
            actor_id = %entry.actor_id,
            target_id = %entry.target_id,
            action = %entry.action,
            "Soft delete recorded"
        );

        Ok(true)
    }
}
