// src/db/school_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::school::{NewSchool, School},
};

#[async_trait]
pub trait SchoolRepository: Send + Sync {
    async fn create(&self, school: NewSchool) -> Result<School, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<School>, AppError>;
    /// Grava o estado completo da escola (admin, pacote, janela, limite).
    async fn update(&self, school: &School) -> Result<School, AppError>;
}

#[derive(Clone)]
pub struct PgSchoolRepository {
    pool: PgPool,
}

impl PgSchoolRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchoolRepository for PgSchoolRepository {
    async fn create(&self, school: NewSchool) -> Result<School, AppError> {
        let created = sqlx::query_as::<_, School>(
            r#"
            INSERT INTO schools (
                name, education_level, status, address,
                initial_student_count, package_id, max_students_allowed
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&school.name)
        .bind(school.education_level)
        .bind(school.status)
        .bind(&school.address)
        .bind(school.initial_student_count)
        .bind(school.package_id)
        .bind(school.max_students_allowed)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<School>, AppError> {
        let school = sqlx::query_as::<_, School>("SELECT * FROM schools WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(school)
    }

    async fn update(&self, school: &School) -> Result<School, AppError> {
        let updated = sqlx::query_as::<_, School>(
            r#"
            UPDATE schools SET
                admin_user_id = $2,
                package_id = $3,
                subscription_start_date = $4,
                subscription_end_date = $5,
                max_students_allowed = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(school.id)
        .bind(school.admin_user_id)
        .bind(school.package_id)
        .bind(school.subscription_start_date)
        .bind(school.subscription_end_date)
        .bind(school.max_students_allowed)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or(AppError::SchoolNotFound)
    }
}
