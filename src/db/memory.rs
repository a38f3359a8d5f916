// src/db/memory.rs
//
// Repositórios em memória, usados nos testes no lugar do Postgres.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        EmailVerificationRepository, PackageRepository, Repositories, RoleRepository,
        SchoolRepository, UserRepository,
    },
    models::{
        package::{NewPackage, Package},
        role::Role,
        school::{NewSchool, School},
        user::{NewUser, User, UserFilter},
        verification::{EmailVerification, NewEmailVerification, VerificationStatus},
    },
};

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            roles: Arc::new(MemoryRoleRepository::default()),
            packages: Arc::new(MemoryPackageRepository::default()),
            schools: Arc::new(MemorySchoolRepository::default()),
            users: Arc::new(MemoryUserRepository::default()),
            verifications: Arc::new(MemoryEmailVerificationRepository::default()),
        }
    }
}

#[derive(Default)]
pub struct MemoryRoleRepository {
    rows: RwLock<Vec<Role>>,
}

#[async_trait]
impl RoleRepository for MemoryRoleRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        Ok(self.rows.read().await.iter().find(|r| r.name == name).cloned())
    }

    async fn create(&self, name: &str, description: &str) -> Result<Role, AppError> {
        let now = Utc::now();
        let role = Role {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: Some(description.to_string()),
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.push(role.clone());
        Ok(role)
    }
}

#[derive(Default)]
pub struct MemoryPackageRepository {
    rows: RwLock<Vec<Package>>,
}

#[async_trait]
impl PackageRepository for MemoryPackageRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Package>, AppError> {
        Ok(self.rows.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Package>, AppError> {
        Ok(self.rows.read().await.iter().find(|p| p.name == name).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Package>, AppError> {
        Ok(self.rows.read().await.clone())
    }

    async fn create(&self, package: NewPackage) -> Result<Package, AppError> {
        let now = Utc::now();
        let created = Package {
            id: Uuid::new_v4(),
            price_per_student: package.price_per_student(),
            price_per_year: package.price_per_year(),
            name: package.name,
            duration_days: package.duration_days,
            max_students: package.max_students,
            features: package.features,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.push(created.clone());
        Ok(created)
    }
}

#[derive(Default)]
pub struct MemorySchoolRepository {
    rows: RwLock<Vec<School>>,
}

#[async_trait]
impl SchoolRepository for MemorySchoolRepository {
    async fn create(&self, school: NewSchool) -> Result<School, AppError> {
        let now = Utc::now();
        let created = School {
            id: Uuid::new_v4(),
            name: school.name,
            education_level: school.education_level,
            status: school.status,
            address: school.address,
            initial_student_count: school.initial_student_count,
            admin_user_id: None,
            package_id: school.package_id,
            subscription_start_date: None,
            subscription_end_date: None,
            max_students_allowed: school.max_students_allowed,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<School>, AppError> {
        Ok(self.rows.read().await.iter().find(|s| s.id == id).cloned())
    }

    async fn update(&self, school: &School) -> Result<School, AppError> {
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|s| s.id == school.id)
            .ok_or(AppError::SchoolNotFound)?;
        *row = School { updated_at: Utc::now(), ..school.clone() };
        Ok(row.clone())
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    rows: RwLock<Vec<User>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|u| u.email == user.email) {
            return Err(AppError::EmailAlreadyExists);
        }
        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            whatsapp_number: user.whatsapp_number,
            position: user.position,
            role_id: user.role_id,
            role_name: user.role_name,
            school_id: user.school_id,
            created_by: user.created_by,
            updated_by: None,
            created_at: now,
            updated_at: now,
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.rows.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.rows.read().await.iter().find(|u| u.email == email).cloned())
    }

    async fn find_all(&self, filter: UserFilter) -> Result<Vec<User>, AppError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .filter(|u| filter.role_id.is_none_or(|role_id| u.role_id == role_id))
            .filter(|u| filter.school_id.is_none_or(|school_id| u.school_id == Some(school_id)))
            .cloned()
            .collect())
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|u| u.email == user.email && u.id != user.id) {
            return Err(AppError::EmailAlreadyExists);
        }
        let row = rows
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(AppError::UserNotFound)?;
        *row = User { updated_at: Utc::now(), ..user.clone() };
        Ok(row.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|u| u.id != id);
        Ok(rows.len() < before)
    }
}

// A ordem do Vec é a ordem de criação; "mais recente" = último.
#[derive(Default)]
pub struct MemoryEmailVerificationRepository {
    rows: RwLock<Vec<EmailVerification>>,
}

#[async_trait]
impl EmailVerificationRepository for MemoryEmailVerificationRepository {
    async fn create(&self, verification: NewEmailVerification) -> Result<EmailVerification, AppError> {
        let now = Utc::now();
        let created = EmailVerification {
            id: Uuid::new_v4(),
            user_id: verification.user_id,
            email: verification.email,
            otp: verification.otp,
            expires_at: verification.expires_at,
            status: VerificationStatus::Pending,
            failed_attempts: 0,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.push(created.clone());
        Ok(created)
    }

    async fn find_by_user_and_otp(
        &self,
        user_id: Uuid,
        otp: &str,
    ) -> Result<Option<EmailVerification>, AppError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .rev()
            .find(|v| v.user_id == user_id && v.otp == otp)
            .cloned())
    }

    async fn find_latest_by_user(&self, user_id: Uuid) -> Result<Option<EmailVerification>, AppError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .rev()
            .find(|v| v.user_id == user_id)
            .cloned())
    }

    // Checagem e escrita sob o mesmo write lock, como o UPDATE condicional do Postgres.
    async fn mark_verified(
        &self,
        id: Uuid,
        max_attempts: i32,
    ) -> Result<Option<EmailVerification>, AppError> {
        let mut rows = self.rows.write().await;
        let Some(row) = rows.iter_mut().find(|v| {
            v.id == id && v.status == VerificationStatus::Pending && v.failed_attempts < max_attempts
        }) else {
            return Ok(None);
        };
        row.status = VerificationStatus::Verified;
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn increment_failed_attempts(&self, id: Uuid) -> Result<Option<i32>, AppError> {
        let mut rows = self.rows.write().await;
        Ok(rows
            .iter_mut()
            .find(|v| v.id == id && v.status == VerificationStatus::Pending)
            .map(|row| {
                row.failed_attempts += 1;
                row.updated_at = Utc::now();
                row.failed_attempts
            }))
    }

    async fn supersede_pending(&self, user_id: Uuid) -> Result<u64, AppError> {
        let mut count = 0;
        for row in self.rows.write().await.iter_mut() {
            if row.user_id == user_id && row.status == VerificationStatus::Pending {
                row.status = VerificationStatus::Superseded;
                row.updated_at = Utc::now();
                count += 1;
            }
        }
        Ok(count)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|v| !(v.expires_at < now && v.status != VerificationStatus::Verified));
        Ok((before - rows.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn pending(repo: &MemoryEmailVerificationRepository) -> EmailVerification {
        repo.create(NewEmailVerification {
            user_id: Uuid::new_v4(),
            email: "siti@example.com".into(),
            otp: "123456".into(),
            expires_at: Utc::now() + Duration::minutes(10),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn mark_verified_succeeds_only_once() {
        let repo = MemoryEmailVerificationRepository::default();
        let record = pending(&repo).await;

        let first = repo.mark_verified(record.id, 5).await.unwrap();
        assert_eq!(first.unwrap().status, VerificationStatus::Verified);
        assert!(repo.mark_verified(record.id, 5).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn mark_verified_refuses_superseded_and_exhausted_records() {
        let repo = MemoryEmailVerificationRepository::default();

        let superseded = pending(&repo).await;
        repo.supersede_pending(superseded.user_id).await.unwrap();
        assert!(repo.mark_verified(superseded.id, 5).await.unwrap().is_none());

        let exhausted = pending(&repo).await;
        for _ in 0..2 {
            repo.increment_failed_attempts(exhausted.id).await.unwrap();
        }
        assert!(repo.mark_verified(exhausted.id, 2).await.unwrap().is_none());
        assert!(repo.mark_verified(exhausted.id, 3).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn increment_touches_only_pending_records() {
        let repo = MemoryEmailVerificationRepository::default();
        let record = pending(&repo).await;

        assert_eq!(repo.increment_failed_attempts(record.id).await.unwrap(), Some(1));
        assert_eq!(repo.increment_failed_attempts(record.id).await.unwrap(), Some(2));

        repo.mark_verified(record.id, 5).await.unwrap();
        assert_eq!(repo.increment_failed_attempts(record.id).await.unwrap(), None);
        assert_eq!(repo.increment_failed_attempts(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_are_not_lost() {
        let repo = Arc::new(MemoryEmailVerificationRepository::default());
        let record = pending(&repo).await;

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..32 {
            let repo = repo.clone();
            tasks.spawn(async move { repo.increment_failed_attempts(record.id).await.unwrap() });
        }
        while let Some(joined) = tasks.join_next().await {
            assert!(joined.unwrap().is_some());
        }

        let latest = repo.find_latest_by_user(record.user_id).await.unwrap().unwrap();
        assert_eq!(latest.failed_attempts, 32);
    }
}
