// src/test_support.rs
//
// Fixtures compartilhadas pelos testes.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::security::PasswordHasher,
    config::{AppState, Config, MasterAdminSeed, OtpPolicy},
    db::{seed, Repositories},
    models::{
        package::Package,
        school::{EducationLevel, School, SchoolStatus},
        user::User,
    },
    services::mailer::memory::MemoryMailer,
};

// Custo mínimo aceito pelo bcrypt (`BCRYPT_MIN_COST` é privado na 0.18).
pub const BCRYPT_MIN_COST: u32 = 4;

pub const MASTER_EMAIL: &str = "masteradmin@barniee.com";
pub const MASTER_PASSWORD: &str = "masteradminpassword";

pub fn hasher() -> PasswordHasher {
    PasswordHasher::new(BCRYPT_MIN_COST)
}

pub fn otp_policy() -> OtpPolicy {
    OtpPolicy { ttl_minutes: 10, max_attempts: 5 }
}

pub fn config() -> Config {
    Config {
        database_url: String::new(),
        jwt_secret: "segredo-de-teste".into(),
        listen_addr: "127.0.0.1:0".into(),
        smtp: None,
        otp: otp_policy(),
        bcrypt_cost: BCRYPT_MIN_COST,
        sweep_interval: std::time::Duration::from_secs(3600),
        master_admin: Some(master_seed()),
    }
}

pub fn master_seed() -> MasterAdminSeed {
    MasterAdminSeed {
        email: MASTER_EMAIL.into(),
        password: MASTER_PASSWORD.into(),
    }
}

/// Repositórios em memória já com cargos, pacotes e master admin.
pub async fn seeded_repositories() -> Repositories {
    let repos = Repositories::in_memory();
    seed::run(&repos, &hasher(), Some(&master_seed()))
        .await
        .expect("seed em memória");
    repos
}

/// AppState completo sobre memória, com o mailer exposto para inspeção.
pub async fn app_state() -> (AppState, Arc<MemoryMailer>) {
    let repos = seeded_repositories().await;
    let mailer = Arc::new(MemoryMailer::default());
    let state = AppState::from_parts(config(), repos, mailer.clone(), hasher());
    (state, mailer)
}

pub fn user_fixture(email: &str, role: &str, school_id: Option<Uuid>) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        name: "Fixture".into(),
        email: email.into(),
        password_hash: String::new(),
        whatsapp_number: None,
        position: None,
        role_id: Uuid::new_v4(),
        role_name: role.into(),
        school_id,
        created_by: None,
        updated_by: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn package_fixture(name: &str, duration_days: Option<i32>, max_students: Option<i32>) -> Package {
    let now = Utc::now();
    Package {
        id: Uuid::new_v4(),
        name: name.into(),
        price_per_student: None,
        price_per_year: None,
        duration_days,
        max_students,
        features: vec![],
        created_at: now,
        updated_at: now,
    }
}

pub fn school_fixture(package_id: Uuid, max_students_allowed: i32) -> School {
    let now = Utc::now();
    School {
        id: Uuid::new_v4(),
        name: "Sekolah Fixture".into(),
        education_level: EducationLevel::SMA,
        status: SchoolStatus::Swasta,
        address: "Jl. Teste 1".into(),
        initial_student_count: 100,
        admin_user_id: None,
        package_id,
        subscription_start_date: None,
        subscription_end_date: None,
        max_students_allowed,
        created_at: now,
        updated_at: now,
    }
}
