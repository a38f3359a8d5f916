// src/db/verification_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::verification::{EmailVerification, NewEmailVerification},
};

#[async_trait]
pub trait EmailVerificationRepository: Send + Sync {
    async fn create(&self, verification: NewEmailVerification) -> Result<EmailVerification, AppError>;

    /// O registro mais recente com esse par (usuário, código).
    async fn find_by_user_and_otp(
        &self,
        user_id: Uuid,
        otp: &str,
    ) -> Result<Option<EmailVerification>, AppError>;

    /// O registro mais recente do usuário: é o único que vale para concluir o cadastro.
    async fn find_latest_by_user(&self, user_id: Uuid) -> Result<Option<EmailVerification>, AppError>;

    /// Passa o registro de `pending` para `verified` numa única instrução.
    /// `None` quando o registro já não está pendente ou esgotou as tentativas.
    async fn mark_verified(
        &self,
        id: Uuid,
        max_attempts: i32,
    ) -> Result<Option<EmailVerification>, AppError>;

    /// Soma uma tentativa falha a um registro ainda pendente e devolve o novo total.
    async fn increment_failed_attempts(&self, id: Uuid) -> Result<Option<i32>, AppError>;

    /// Marca todos os registros `pending` do usuário como `superseded`.
    async fn supersede_pending(&self, user_id: Uuid) -> Result<u64, AppError>;

    /// Apaga registros não verificados já expirados.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

#[derive(Clone)]
pub struct PgEmailVerificationRepository {
    pool: PgPool,
}

impl PgEmailVerificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmailVerificationRepository for PgEmailVerificationRepository {
    async fn create(&self, verification: NewEmailVerification) -> Result<EmailVerification, AppError> {
        let created = sqlx::query_as::<_, EmailVerification>(
            r#"
            INSERT INTO email_verifications (user_id, email, otp, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(verification.user_id)
        .bind(&verification.email)
        .bind(&verification.otp)
        .bind(verification.expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_by_user_and_otp(
        &self,
        user_id: Uuid,
        otp: &str,
    ) -> Result<Option<EmailVerification>, AppError> {
        let verification = sqlx::query_as::<_, EmailVerification>(
            r#"
            SELECT * FROM email_verifications
            WHERE user_id = $1 AND otp = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(otp)
        .fetch_optional(&self.pool)
        .await?;
        Ok(verification)
    }

    async fn find_latest_by_user(&self, user_id: Uuid) -> Result<Option<EmailVerification>, AppError> {
        let verification = sqlx::query_as::<_, EmailVerification>(
            r#"
            SELECT * FROM email_verifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(verification)
    }

    async fn mark_verified(
        &self,
        id: Uuid,
        max_attempts: i32,
    ) -> Result<Option<EmailVerification>, AppError> {
        // A condição no WHERE garante uma única transição pending -> verified
        let verified = sqlx::query_as::<_, EmailVerification>(
            r#"
            UPDATE email_verifications
            SET status = 'verified', updated_at = NOW()
            WHERE id = $1
              AND status = 'pending'
              AND failed_attempts < $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(max_attempts)
        .fetch_optional(&self.pool)
        .await?;
        Ok(verified)
    }

    async fn increment_failed_attempts(&self, id: Uuid) -> Result<Option<i32>, AppError> {
        let attempts = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE email_verifications
            SET failed_attempts = failed_attempts + 1, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING failed_attempts
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(attempts)
    }

    async fn supersede_pending(&self, user_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE email_verifications
            SET status = 'superseded', updated_at = NOW()
            WHERE user_id = $1 AND status = 'pending'
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM email_verifications WHERE expires_at < $1 AND status <> 'verified'",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
