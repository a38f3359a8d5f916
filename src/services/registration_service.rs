// src/services/registration_service.rs
//
// Fluxo de cadastro de escola em etapas. Não existe cursor salvo:
// cada etapa reconfere suas pré-condições a partir dos dados atuais.

use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        security::{generate_otp, generate_random_password, PasswordHasher, GENERATED_PASSWORD_LENGTH},
    },
    config::OtpPolicy,
    db::{
        EmailVerificationRepository, PackageRepository, Repositories, RoleRepository,
        SchoolRepository, UserRepository,
    },
    models::{
        package::{Package, FREE_TRIAL},
        registration::RegistrationState,
        role::RoleName,
        school::{EducationLevel, NewSchool, School, SchoolStatus},
        user::{NewUser, User},
        verification::{EmailVerification, NewEmailVerification, VerificationStatus},
    },
    services::{mailer::Mailer, subscription},
};

const OTP_EMAIL_SUBJECT: &str = "Barniee: Kode Verifikasi Email Anda";

/// Etapa 1.
#[derive(Debug, Clone)]
pub struct SchoolInfo {
    pub name: String,
    pub education_level: EducationLevel,
    pub status: SchoolStatus,
    pub address: String,
    pub initial_student_count: i32,
}

/// Etapa 2.
#[derive(Debug, Clone)]
pub struct AdminInfo {
    pub name: String,
    pub email: String,
    pub whatsapp_number: String,
    pub position: String,
}

#[derive(Clone)]
pub struct RegistrationService {
    roles: Arc<dyn RoleRepository>,
    packages: Arc<dyn PackageRepository>,
    schools: Arc<dyn SchoolRepository>,
    users: Arc<dyn UserRepository>,
    verifications: Arc<dyn EmailVerificationRepository>,
    mailer: Arc<dyn Mailer>,
    hasher: PasswordHasher,
    otp_policy: OtpPolicy,
}

impl RegistrationService {
    pub fn new(
        repos: &Repositories,
        mailer: Arc<dyn Mailer>,
        hasher: PasswordHasher,
        otp_policy: OtpPolicy,
    ) -> Self {
        Self {
            roles: repos.roles.clone(),
            packages: repos.packages.clone(),
            schools: repos.schools.clone(),
            users: repos.users.clone(),
            verifications: repos.verifications.clone(),
            mailer,
            hasher,
            otp_policy,
        }
    }

    async fn load_school(&self, school_id: Uuid) -> Result<School, AppError> {
        self.schools
            .find_by_id(school_id)
            .await?
            .ok_or(AppError::SchoolNotFound)
    }

    async fn free_trial(&self) -> Result<Package, AppError> {
        self.packages
            .find_by_name(FREE_TRIAL)
            .await?
            .ok_or_else(|| AppError::MissingSeedData(format!("pacote '{FREE_TRIAL}'")))
    }

    // --- Etapa 1: dados da escola, sempre no Free Trial ---
    pub async fn register_school_info(&self, info: SchoolInfo) -> Result<School, AppError> {
        let trial = self.free_trial().await?;

        let school = self
            .schools
            .create(NewSchool {
                name: info.name,
                education_level: info.education_level,
                status: info.status,
                address: info.address,
                initial_student_count: info.initial_student_count,
                package_id: trial.id,
                max_students_allowed: trial.student_cap(),
            })
            .await?;

        tracing::info!(school_id = %school.id, "🏫 Escola cadastrada");
        Ok(school)
    }

    // --- Etapa 2: administrador da escola, com senha gerada ---
    pub async fn register_admin_info(
        &self,
        school_id: Uuid,
        info: AdminInfo,
    ) -> Result<(User, String), AppError> {
        let mut school = self.load_school(school_id).await?;

        if self.users.find_by_email(&info.email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }

        let admin_role = self
            .roles
            .find_by_name(RoleName::Admin.as_str())
            .await?
            .ok_or_else(|| AppError::MissingSeedData("cargo 'admin'".into()))?;

        let password = generate_random_password(GENERATED_PASSWORD_LENGTH);
        let password_hash = self.hasher.hash(&password).await?;

        let admin = self
            .users
            .create(NewUser {
                name: info.name,
                email: info.email,
                password_hash,
                whatsapp_number: Some(info.whatsapp_number),
                position: Some(info.position),
                role_id: admin_role.id,
                role_name: admin_role.name,
                school_id: Some(school.id),
                created_by: None,
            })
            .await?;

        // Segunda escrita, não atômica: se falhar, a escola fica sem admin
        // e a etapa pode ser repetida com outro e-mail.
        school.admin_user_id = Some(admin.id);
        self.schools.update(&school).await?;

        tracing::info!(school_id = %school.id, user_id = %admin.id, "👤 Administrador vinculado");
        Ok((admin, password))
    }

    // --- Etapa 3 ---
    pub async fn select_package(&self, school_id: Uuid, package_id: Uuid) -> Result<School, AppError> {
        let mut school = self.load_school(school_id).await?;
        let package = self.get_package(package_id).await?;

        subscription::apply_package(&mut school, &package, Utc::now());
        let school = self.schools.update(&school).await?;

        tracing::info!(school_id = %school.id, package = %package.name, "📦 Pacote selecionado");
        Ok(school)
    }

    // --- Etapa 4 ---
    pub async fn request_email_verification_otp(&self, user_id: Uuid) -> Result<(), AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let superseded = self.verifications.supersede_pending(user.id).await?;
        if superseded > 0 {
            tracing::debug!(user_id = %user.id, superseded, "OTPs anteriores substituídos");
        }

        let otp = generate_otp();
        let verification = self
            .verifications
            .create(NewEmailVerification {
                user_id: user.id,
                email: user.email.clone(),
                otp: otp.clone(),
                expires_at: Utc::now() + Duration::minutes(self.otp_policy.ttl_minutes),
            })
            .await?;

        let body = format!(
            "Halo {},\n\nKode verifikasi Anda adalah: {}\nKode ini akan kedaluwarsa dalam {} menit.\n\nTerima kasih,\nTim Barniee",
            user.name, otp, self.otp_policy.ttl_minutes
        );

        // O registro já está salvo: se o envio falhar, basta pedir outro código.
        self.mailer
            .send(&user.email, OTP_EMAIL_SUBJECT, &body)
            .await
            .context("falha ao enviar e-mail com OTP")?;

        tracing::info!(user_id = %user.id, verification_id = %verification.id, "✉️ OTP emitido");
        Ok(())
    }

    // --- Etapa 5 ---
    pub async fn verify_email_otp(&self, user_id: Uuid, otp: &str) -> Result<(), AppError> {
        let Some(verification) = self.verifications.find_by_user_and_otp(user_id, otp).await? else {
            self.record_failed_attempt(user_id).await?;
            return Err(AppError::InvalidOtp);
        };

        if let Some(refusal) = self.refusal(&verification) {
            return Err(refusal);
        }

        // Outra requisição pode ter mudado o registro desde a leitura acima
        if self
            .verifications
            .mark_verified(verification.id, self.otp_policy.max_attempts)
            .await?
            .is_none()
        {
            let current = self.verifications.find_by_user_and_otp(user_id, otp).await?;
            return Err(current
                .and_then(|v| self.refusal(&v))
                .unwrap_or(AppError::OtpAlreadyVerified));
        }

        tracing::info!(%user_id, "✅ E-mail verificado");
        Ok(())
    }

    // Motivo para recusar um código que bate, ou None se ele ainda vale.
    fn refusal(&self, verification: &EmailVerification) -> Option<AppError> {
        match verification.status {
            VerificationStatus::Verified => Some(AppError::OtpAlreadyVerified),
            VerificationStatus::Superseded => Some(AppError::OtpSuperseded),
            VerificationStatus::Pending if verification.failed_attempts >= self.otp_policy.max_attempts => {
                Some(AppError::TooManyOtpAttempts)
            }
            VerificationStatus::Pending if verification.is_expired_at(Utc::now()) => Some(AppError::OtpExpired),
            VerificationStatus::Pending => None,
        }
    }

    // Código errado conta contra o OTP pendente mais recente do usuário.
    async fn record_failed_attempt(&self, user_id: Uuid) -> Result<(), AppError> {
        let Some(latest) = self.verifications.find_latest_by_user(user_id).await? else {
            return Ok(());
        };
        if let Some(attempts) = self.verifications.increment_failed_attempts(latest.id).await? {
            tracing::warn!(%user_id, attempts, "Tentativa de OTP inválida");
        }
        Ok(())
    }

    // --- Etapa 6: portão de aceite ---
    pub async fn complete_registration(&self, school_id: Uuid) -> Result<School, AppError> {
        let mut school = self.load_school(school_id).await?;
        let admin_id = school.admin_user_id.ok_or(AppError::AdminNotLinked)?;

        let verified = self
            .verifications
            .find_latest_by_user(admin_id)
            .await?
            .is_some_and(|v| v.is_verified());
        if !verified {
            return Err(AppError::AdminEmailNotVerified);
        }

        let package = self.get_package(school.package_id).await?;
        if subscription::ensure_trial_window(&mut school, &package, Utc::now()) {
            school = self.schools.update(&school).await?;
        }

        tracing::info!(school_id = %school.id, "🎉 Cadastro concluído");
        Ok(school)
    }

    // ---
    // Leituras auxiliares
    // ---

    pub async fn list_packages(&self) -> Result<Vec<Package>, AppError> {
        self.packages.find_all().await
    }

    pub async fn get_package(&self, package_id: Uuid) -> Result<Package, AppError> {
        self.packages
            .find_by_id(package_id)
            .await?
            .ok_or(AppError::PackageNotFound)
    }

    pub async fn get_school(&self, school_id: Uuid) -> Result<School, AppError> {
        self.load_school(school_id).await
    }

    /// Deriva em que etapa o cadastro está, para a UI retomar de onde parou.
    pub async fn registration_status(&self, school_id: Uuid) -> Result<RegistrationState, AppError> {
        let school = self.load_school(school_id).await?;
        let Some(admin_id) = school.admin_user_id else {
            return Ok(RegistrationState::SchoolCreated);
        };

        let package = self.get_package(school.package_id).await?;
        // Pacote decidido: janela gravada ou pacote diferente do trial
        let package_decided = school.has_subscription_window() || !package.is_free_trial();

        let email_verified = self
            .verifications
            .find_latest_by_user(admin_id)
            .await?
            .is_some_and(|v| v.is_verified());

        Ok(match (email_verified, package_decided) {
            (true, true) => RegistrationState::Completed,
            (true, false) => RegistrationState::EmailVerified,
            (false, true) => RegistrationState::PackageSelected,
            (false, false) => RegistrationState::AdminLinked,
        })
    }

    /// Remove OTPs vencidos que não foram verificados.
    pub async fn purge_expired_verifications(&self) -> Result<u64, AppError> {
        let removed = self.verifications.delete_expired(Utc::now()).await?;
        if removed > 0 {
            tracing::info!(removed, "🧹 Verificações expiradas removidas");
        }
        Ok(removed)
    }
}
