// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    common::security::PasswordHasher,
    db::{seed, Repositories},
    services::{
        auth::AuthService,
        mailer::{LogMailer, Mailer, SmtpMailer},
        registration_service::RegistrationService,
        token::TokenService,
        user_service::UserService,
    },
};

// ---
// Configuração (lida uma vez, no boot)
// ---

#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender: String,
}

// Política do OTP de verificação de e-mail
#[derive(Debug, Clone, Copy)]
pub struct OtpPolicy {
    pub ttl_minutes: i64,
    pub max_attempts: i32,
}

#[derive(Clone)]
pub struct MasterAdminSeed {
    pub email: String,
    pub password: String,
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub listen_addr: String,
    // None => e-mails só vão para o log (ambiente de dev)
    pub smtp: Option<SmtpConfig>,
    pub otp: OtpPolicy,
    pub bcrypt_cost: u32,
    pub sweep_interval: Duration,
    pub master_admin: Option<MasterAdminSeed>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let smtp = match env::var("SMTP_HOST") {
            Ok(host) => Some(SmtpConfig {
                host,
                port: env_parse("SMTP_PORT", 587)?,
                username: env::var("SMTP_USERNAME").unwrap_or_default(),
                password: env::var("SMTP_PASSWORD").unwrap_or_default(),
                sender: env::var("SENDER_EMAIL").context("SENDER_EMAIL deve ser definido junto com SMTP_HOST")?,
            }),
            Err(_) => None,
        };

        let master_admin = match (env::var("MASTER_ADMIN_EMAIL"), env::var("MASTER_ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(MasterAdminSeed { email, password }),
            _ => None,
        };

        Ok(Self {
            database_url: database_url()?,
            jwt_secret,
            listen_addr: env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            smtp,
            otp: OtpPolicy {
                ttl_minutes: env_parse("OTP_EXPIRY_MINUTES", 10)?,
                max_attempts: env_parse("OTP_MAX_ATTEMPTS", 5)?,
            },
            bcrypt_cost: env_parse("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            sweep_interval: Duration::from_secs(env_parse("VERIFICATION_SWEEP_INTERVAL_SECS", 3600)?),
            master_admin,
        })
    }
}

// DATABASE_URL tem prioridade; senão monta a partir de DB_HOST, DB_PORT, etc.
fn database_url() -> anyhow::Result<String> {
    if let Ok(url) = env::var("DATABASE_URL") {
        return Ok(url);
    }

    let host = env::var("DB_HOST").context("DATABASE_URL ou DB_HOST deve ser definida")?;
    let port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
    let user = env::var("DB_USER").context("DB_USER deve ser definido")?;
    let password = env::var("DB_PASSWORD").unwrap_or_default();
    let name = env::var("DB_NAME").context("DB_NAME deve ser definido")?;

    Ok(format!("postgres://{user}:{password}@{host}:{port}/{name}"))
}

fn env_parse<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} inválida: '{raw}'")),
        Err(_) => Ok(default),
    }
}

// ---
// Estado compartilhado
// ---

#[derive(Clone)]
pub struct AppState {
    pub token_service: TokenService,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub registration_service: RegistrationService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        sqlx::migrate!()
            .run(&db_pool)
            .await
            .context("Falha ao rodar as migrações do banco de dados")?;

        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

        let mailer: Arc<dyn Mailer> = match &config.smtp {
            Some(smtp) => Arc::new(SmtpMailer::new(smtp)?),
            None => {
                tracing::warn!("SMTP_HOST não definido: e-mails serão apenas logados");
                Arc::new(LogMailer)
            }
        };

        let repos = Repositories::postgres(db_pool);
        let hasher = PasswordHasher::new(config.bcrypt_cost);

        seed::run(&repos, &hasher, config.master_admin.as_ref())
            .await
            .context("Falha ao semear dados iniciais")?;

        Ok(Self::from_parts(config, repos, mailer, hasher))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_parts(
        config: Config,
        repos: Repositories,
        mailer: Arc<dyn Mailer>,
        hasher: PasswordHasher,
    ) -> Self {
        let token_service = TokenService::new(config.jwt_secret.clone());

        let auth_service = AuthService::new(
            repos.users.clone(),
            repos.schools.clone(),
            token_service.clone(),
            hasher,
        );
        let user_service = UserService::new(repos.users.clone(), repos.roles.clone(), hasher);
        let registration_service =
            RegistrationService::new(&repos, mailer, hasher, config.otp);

        Self {
            token_service,
            auth_service,
            user_service,
            registration_service,
        }
    }
}
