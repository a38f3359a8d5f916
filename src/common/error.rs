use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Erro único da aplicação. Cada variante já sabe em que classe HTTP cai.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // --- 404 ---
    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Escola não encontrada")]
    SchoolNotFound,

    #[error("Pacote não encontrado")]
    PackageNotFound,

    #[error("Cargo '{0}' não encontrado")]
    RoleNotFound(String),

    // --- 409 ---
    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Usuário administrador não associado à escola")]
    AdminNotLinked,

    #[error("E-mail do administrador ainda não verificado")]
    AdminEmailNotVerified,

    #[error("E-mail já verificado")]
    OtpAlreadyVerified,

    #[error("Código substituído por um mais recente")]
    OtpSuperseded,

    // --- 400 ---
    #[error("Código OTP ou usuário inválido")]
    InvalidOtp,

    #[error("Cargo inválido: {0}")]
    InvalidRole(String),

    // --- 410 / 429 ---
    #[error("Código OTP expirado")]
    OtpExpired,

    #[error("Tentativas de verificação esgotadas")]
    TooManyOtpAttempts,

    // --- 401 / 403 ---
    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    // Dado de seed ausente (ex.: pacote "Free Trial"). Falha de implantação, não do usuário.
    #[error("Dado obrigatório ausente no sistema: {0}")]
    MissingSeedData(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidOtp | AppError::InvalidRole(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::UserNotFound
            | AppError::SchoolNotFound
            | AppError::PackageNotFound
            | AppError::RoleNotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists
            | AppError::AdminNotLinked
            | AppError::AdminEmailNotVerified
            | AppError::OtpAlreadyVerified
            | AppError::OtpSuperseded => StatusCode::CONFLICT,
            AppError::OtpExpired => StatusCode::GONE,
            AppError::TooManyOtpAttempts => StatusCode::TOO_MANY_REQUESTS,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::MissingSeedData(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_message = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (status, body).into_response();
            }
            AppError::EmailAlreadyExists => "Este e-mail já está em uso.".to_string(),
            // Mesma mensagem para e-mail inexistente e senha errada (evita enumeração).
            AppError::InvalidCredentials => "E-mail ou senha inválidos.".to_string(),
            AppError::InvalidToken => "Token de autenticação inválido ou ausente.".to_string(),

            // 5xx: loga o detalhe, devolve mensagem genérica.
            ref e if status.is_server_error() => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                "Ocorreu um erro inesperado.".to_string()
            }
            e => format!("{}.", e),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
