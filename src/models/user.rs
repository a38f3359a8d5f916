// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::role::RoleName;

// Representa um usuário vindo do banco de dados (já com o nome do cargo)
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    #[schema(example = "Siti Aminah")]
    pub name: String,

    #[schema(example = "siti.aminah@example.com")]
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub whatsapp_number: Option<String>,
    pub position: Option<String>,

    pub role_id: Uuid,
    #[schema(example = "admin")]
    pub role_name: String,

    // None => administrador master (nível de plataforma)
    pub school_id: Option<Uuid>,

    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role_name == RoleName::Admin.as_str()
    }

    pub fn is_master_admin(&self) -> bool {
        self.is_admin() && self.school_id.is_none()
    }
}

// Dados para inserir um usuário
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub whatsapp_number: Option<String>,
    pub position: Option<String>,
    pub role_id: Uuid,
    pub role_name: String,
    pub school_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
}

// Filtros do FindAll. None = não filtra.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserFilter {
    pub role_id: Option<Uuid>,
    pub school_id: Option<Uuid>,
}

// ---
// Payloads da área administrativa
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Budi Santoso")]
    pub name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "budi@example.com")]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    #[validate(length(min = 1, message = "O cargo é obrigatório."))]
    #[schema(example = "teacher")]
    pub role: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, message = "O nome não pode ser vazio."))]
    pub name: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub role: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// Filtra pelo nome do cargo (admin, teacher, student)
    pub role: Option<String>,
}
