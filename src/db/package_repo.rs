// src/db/package_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::package::{NewPackage, Package},
};

// Pacotes são semeados uma vez; o fluxo de cadastro só lê.
#[async_trait]
pub trait PackageRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Package>, AppError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Package>, AppError>;
    async fn find_all(&self) -> Result<Vec<Package>, AppError>;
    async fn create(&self, package: NewPackage) -> Result<Package, AppError>;
}

#[derive(Clone)]
pub struct PgPackageRepository {
    pool: PgPool,
}

impl PgPackageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PackageRepository for PgPackageRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Package>, AppError> {
        let package = sqlx::query_as::<_, Package>("SELECT * FROM packages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(package)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Package>, AppError> {
        let package = sqlx::query_as::<_, Package>("SELECT * FROM packages WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(package)
    }

    async fn find_all(&self) -> Result<Vec<Package>, AppError> {
        let packages = sqlx::query_as::<_, Package>("SELECT * FROM packages ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(packages)
    }

    async fn create(&self, package: NewPackage) -> Result<Package, AppError> {
        let created = sqlx::query_as::<_, Package>(
            r#"
            INSERT INTO packages (
                name, price_per_student, price_per_year,
                duration_days, max_students, features
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&package.name)
        .bind(package.price_per_student())
        .bind(package.price_per_year())
        .bind(package.duration_days)
        .bind(package.max_students)
        .bind(&package.features)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }
}
