// src/db.rs

use std::sync::Arc;

use sqlx::PgPool;

pub mod package_repo;
pub use package_repo::{PackageRepository, PgPackageRepository};
pub mod role_repo;
pub use role_repo::{PgRoleRepository, RoleRepository};
pub mod school_repo;
pub use school_repo::{PgSchoolRepository, SchoolRepository};
pub mod user_repo;
pub use user_repo::{PgUserRepository, UserRepository};
pub mod verification_repo;
pub use verification_repo::{EmailVerificationRepository, PgEmailVerificationRepository};

pub mod seed;

#[cfg(test)]
pub mod memory;

// Todos os repositórios, como trait objects, para injetar nos serviços.
#[derive(Clone)]
pub struct Repositories {
    pub roles: Arc<dyn RoleRepository>,
    pub packages: Arc<dyn PackageRepository>,
    pub schools: Arc<dyn SchoolRepository>,
    pub users: Arc<dyn UserRepository>,
    pub verifications: Arc<dyn EmailVerificationRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            roles: Arc::new(PgRoleRepository::new(pool.clone())),
            packages: Arc::new(PgPackageRepository::new(pool.clone())),
            schools: Arc::new(PgSchoolRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            verifications: Arc::new(PgEmailVerificationRepository::new(pool)),
        }
    }
}
