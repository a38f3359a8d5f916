// src/models/verification.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Mapeia o CREATE TYPE verification_status do banco.
// pending -> verified (uma vez, sem volta); pending -> superseded (novo OTP pedido).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "verification_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Superseded,
}

// Uma tentativa de OTP
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EmailVerification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,

    #[serde(skip_serializing)]
    pub otp: String,

    pub expires_at: DateTime<Utc>,
    pub status: VerificationStatus,
    pub failed_attempts: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EmailVerification {
    pub fn is_verified(&self) -> bool {
        self.status == VerificationStatus::Verified
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Clone)]
pub struct NewEmailVerification {
    pub user_id: Uuid,
    pub email: String,
    pub otp: String,
    pub expires_at: DateTime<Utc>,
}
