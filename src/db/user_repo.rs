// src/db/user_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::user::{NewUser, User, UserFilter},
};

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_all(&self, filter: UserFilter) -> Result<Vec<User>, AppError>;
    async fn update(&self, user: &User) -> Result<User, AppError>;
    /// Retorna `false` se não havia linha para apagar.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

// Toda leitura traz o nome do cargo junto (JOIN com roles).
const SELECT_USER: &str = r#"
    SELECT
        u.id, u.name, u.email, u.password_hash,
        u.whatsapp_number, u.position,
        u.role_id, r.name AS role_name,
        u.school_id, u.created_by, u.updated_by,
        u.created_at, u.updated_at
    FROM users u
    JOIN roles r ON r.id = u.role_id
"#;

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Converte violação de chave única do e-mail num erro amigável
fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() && db_err.constraint() == Some("users_email_key") {
            return AppError::EmailAlreadyExists;
        }
    }
    e.into()
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let created = sqlx::query_as::<_, User>(
            r#"
            WITH inserted AS (
                INSERT INTO users (
                    name, email, password_hash, whatsapp_number, position,
                    role_id, school_id, created_by
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
            )
            SELECT
                u.id, u.name, u.email, u.password_hash,
                u.whatsapp_number, u.position,
                u.role_id, r.name AS role_name,
                u.school_id, u.created_by, u.updated_by,
                u.created_at, u.updated_at
            FROM inserted u
            JOIN roles r ON r.id = u.role_id
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.whatsapp_number)
        .bind(&user.position)
        .bind(user.role_id)
        .bind(user.school_id)
        .bind(user.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let query = format!("{SELECT_USER} WHERE u.id = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let query = format!("{SELECT_USER} WHERE u.email = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_all(&self, filter: UserFilter) -> Result<Vec<User>, AppError> {
        let query = format!(
            "{SELECT_USER}
             WHERE ($1::uuid IS NULL OR u.role_id = $1)
               AND ($2::uuid IS NULL OR u.school_id = $2)
             ORDER BY u.created_at"
        );
        let users = sqlx::query_as::<_, User>(&query)
            .bind(filter.role_id)
            .bind(filter.school_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        let updated = sqlx::query_as::<_, User>(
            r#"
            WITH updated AS (
                UPDATE users SET
                    name = $2,
                    email = $3,
                    role_id = $4,
                    updated_by = $5,
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT
                u.id, u.name, u.email, u.password_hash,
                u.whatsapp_number, u.position,
                u.role_id, r.name AS role_name,
                u.school_id, u.created_by, u.updated_by,
                u.created_at, u.updated_at
            FROM updated u
            JOIN roles r ON r.id = u.role_id
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role_id)
        .bind(user.updated_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        updated.ok_or(AppError::UserNotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
