// src/models/registration.rs
//
// Respostas do fluxo de cadastro de escola.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{package::Package, school::School};

/// Estado implícito do cadastro. Não é persistido: é derivado dos dados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
pub enum RegistrationState {
    SchoolCreated,
    AdminLinked,
    PackageSelected,
    EmailVerified,
    Completed,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchoolInfoResponse {
    pub school_id: Uuid,
    pub school_name: String,
}

// A senha gerada só aparece aqui, uma única vez.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminInfoResponse {
    pub user_id: Uuid,
    pub email: String,
    #[schema(example = "GeneratedPass123")]
    pub password: String,
    pub school_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PackagesResponse {
    pub packages: Vec<Package>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SchoolResponse {
    pub school: School,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationStatusResponse {
    pub school_id: Uuid,
    pub state: RegistrationState,
}
