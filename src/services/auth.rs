// src/services/auth.rs

use std::sync::Arc;

use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    common::{error::AppError, security::PasswordHasher},
    db::{SchoolRepository, UserRepository},
    models::{school::School, user::User},
    services::token::TokenService,
};

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    schools: Arc<dyn SchoolRepository>,
    token_service: TokenService,
    hasher: PasswordHasher,
    // Hash descartável com o mesmo custo dos reais, calculado no primeiro uso.
    dummy_hash: Arc<OnceCell<String>>,
}

const DUMMY_PASSWORD: &str = "senha-inexistente";

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        schools: Arc<dyn SchoolRepository>,
        token_service: TokenService,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            users,
            schools,
            token_service,
            hasher,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        // E-mail inexistente e senha errada dão o mesmo erro e o mesmo trabalho de bcrypt
        let Some(user) = self.users.find_by_email(email).await? else {
            let dummy = self
                .dummy_hash
                .get_or_try_init(|| self.hasher.hash(DUMMY_PASSWORD))
                .await?;
            self.hasher.verify(password, dummy).await?;
            return Err(AppError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "🔑 Login efetuado");
        self.token_service.generate(&user)
    }

    /// Usuário e, se houver, sua escola. A escola nunca derruba o perfil.
    pub async fn get_user_profile(&self, user_id: Uuid) -> Result<(User, Option<School>), AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let school = match user.school_id {
            Some(school_id) => match self.schools.find_by_id(school_id).await {
                Ok(Some(school)) => Some(school),
                Ok(None) => {
                    tracing::warn!(%school_id, user_id = %user.id, "Escola do usuário não encontrada");
                    None
                }
                Err(e) => {
                    tracing::warn!(%school_id, user_id = %user.id, "Falha ao buscar escola do perfil: {:?}", e);
                    None
                }
            },
            None => None,
        };

        Ok((user, school))
    }
}
