// src/db/seed.rs
//
// Dados iniciais: cargos, pacotes e o administrador master.
// Cada item só é criado se ainda não existir.

use rust_decimal::Decimal;

use crate::{
    common::{error::AppError, security::PasswordHasher},
    config::MasterAdminSeed,
    db::Repositories,
    models::{
        package::{NewPackage, PricingShape, FREE_TRIAL},
        role::RoleName,
        user::NewUser,
    },
};

pub async fn run(
    repos: &Repositories,
    hasher: &PasswordHasher,
    master_admin: Option<&MasterAdminSeed>,
) -> Result<(), AppError> {
    seed_roles(repos).await?;
    seed_packages(repos).await?;
    if let Some(master_admin) = master_admin {
        seed_master_admin(repos, hasher, master_admin).await?;
    }
    Ok(())
}

async fn seed_roles(repos: &Repositories) -> Result<(), AppError> {
    for role in RoleName::ALL {
        if repos.roles.find_by_name(role.as_str()).await?.is_none() {
            repos.roles.create(role.as_str(), role.description()).await?;
            tracing::info!("🌱 Cargo '{}' criado", role);
        }
    }
    Ok(())
}

fn default_packages() -> Vec<NewPackage> {
    vec![
        NewPackage {
            name: FREE_TRIAL.to_string(),
            pricing: PricingShape::Free,
            duration_days: Some(30),
            max_students: Some(50),
            features: vec![
                "Dashboard dasar".into(),
                "Laporan bulanan".into(),
                "Email support".into(),
                "Data backup".into(),
            ],
        },
        NewPackage {
            name: "Premium".to_string(),
            pricing: PricingShape::PerStudent(Decimal::from(50_000)),
            duration_days: None,
            max_students: None,
            features: vec![
                "Unlimited siswa".into(),
                "AI Analytics lengkap".into(),
                "Real-time monitoring".into(),
                "Priority support 24/7".into(),
                "Custom reports".into(),
                "Parent app access".into(),
            ],
        },
        NewPackage {
            name: "Enterprise".to_string(),
            pricing: PricingShape::PerYear(Decimal::from(10_000_000_000_i64)),
            duration_days: None,
            max_students: None,
            features: vec![
                "Unlimited siswa".into(),
                "Multi-campus support".into(),
                "Custom AI features".into(),
                "Dedicated account manager".into(),
                "On-site training".into(),
                "API integration".into(),
            ],
        },
    ]
}

async fn seed_packages(repos: &Repositories) -> Result<(), AppError> {
    for package in default_packages() {
        if repos.packages.find_by_name(&package.name).await?.is_none() {
            let created = repos.packages.create(package).await?;
            tracing::info!("🌱 Pacote '{}' criado", created.name);
        }
    }
    Ok(())
}

async fn seed_master_admin(
    repos: &Repositories,
    hasher: &PasswordHasher,
    seed: &MasterAdminSeed,
) -> Result<(), AppError> {
    if repos.users.find_by_email(&seed.email).await?.is_some() {
        return Ok(());
    }

    let admin_role = repos
        .roles
        .find_by_name(RoleName::Admin.as_str())
        .await?
        .ok_or_else(|| AppError::MissingSeedData("cargo admin".into()))?;

    let password_hash = hasher.hash(&seed.password).await?;

    repos
        .users
        .create(NewUser {
            name: "Barniee Master Admin".to_string(),
            email: seed.email.clone(),
            password_hash,
            whatsapp_number: None,
            position: None,
            role_id: admin_role.id,
            role_name: admin_role.name,
            school_id: None,
            created_by: None,
        })
        .await?;

    tracing::info!("🌱 Administrador master '{}' criado", seed.email);
    Ok(())
}
