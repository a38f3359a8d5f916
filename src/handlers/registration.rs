// src/handlers/registration.rs
//
// Rotas públicas do cadastro de escola, na ordem das etapas.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        auth::MessageResponse,
        registration::{
            AdminInfoResponse, PackagesResponse, RegistrationStatusResponse, SchoolInfoResponse,
            SchoolResponse,
        },
        school::{EducationLevel, SchoolStatus},
    },
    services::registration_service::{AdminInfo, SchoolInfo},
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSchoolInfoPayload {
    #[validate(length(min = 1, message = "O nome da escola é obrigatório."))]
    #[schema(example = "Barniee Academy")]
    pub name: String,

    #[schema(example = "SMA")]
    pub education_level: EducationLevel,

    #[schema(example = "Swasta")]
    pub status: SchoolStatus,

    #[validate(length(min = 1, message = "O endereço é obrigatório."))]
    #[schema(example = "Jl. Inovasi No. 10, Kota Teknologi")]
    pub address: String,

    #[validate(range(min = 1, message = "A escola precisa ter pelo menos 1 aluno."))]
    #[schema(example = 150)]
    pub initial_student_count: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAdminInfoPayload {
    pub school_id: Uuid,

    #[validate(length(min = 1, message = "O nome do administrador é obrigatório."))]
    #[schema(example = "Siti Aminah")]
    pub admin_name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "siti.aminah@example.com")]
    pub admin_email: String,

    #[validate(length(min = 1, message = "O WhatsApp é obrigatório."))]
    #[schema(example = "081234567890")]
    pub whatsapp_number: String,

    #[validate(length(min = 1, message = "O cargo na escola é obrigatório."))]
    #[schema(example = "Direktur")]
    pub position: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectPackagePayload {
    pub school_id: Uuid,
    pub package_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestOtpPayload {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpPayload {
    pub user_id: Uuid,

    #[validate(length(equal = 6, message = "O código deve ter 6 dígitos."))]
    #[schema(example = "123456")]
    pub otp: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRegistrationPayload {
    pub school_id: Uuid,
}

// ---
// Handlers
// ---

// Etapa 1
#[utoipa::path(
    post,
    path = "/api/v1/register/school-info",
    tag = "Registration",
    request_body = RegisterSchoolInfoPayload,
    responses(
        (status = 201, description = "Escola cadastrada no Free Trial", body = SchoolInfoResponse),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn register_school_info(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterSchoolInfoPayload>,
) -> Result<(StatusCode, Json<SchoolInfoResponse>), AppError> {
    payload.validate()?;

    let school = app_state
        .registration_service
        .register_school_info(SchoolInfo {
            name: payload.name,
            education_level: payload.education_level,
            status: payload.status,
            address: payload.address,
            initial_student_count: payload.initial_student_count,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SchoolInfoResponse {
            school_id: school.id,
            school_name: school.name,
        }),
    ))
}

// Etapa 2
#[utoipa::path(
    post,
    path = "/api/v1/register/admin-info",
    tag = "Registration",
    request_body = RegisterAdminInfoPayload,
    responses(
        (status = 201, description = "Administrador criado. A senha só aparece aqui.", body = AdminInfoResponse),
        (status = 404, description = "Escola não encontrada"),
        (status = 409, description = "E-mail já em uso")
    )
)]
pub async fn register_admin_info(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterAdminInfoPayload>,
) -> Result<(StatusCode, Json<AdminInfoResponse>), AppError> {
    payload.validate()?;

    let (admin, password) = app_state
        .registration_service
        .register_admin_info(
            payload.school_id,
            AdminInfo {
                name: payload.admin_name,
                email: payload.admin_email,
                whatsapp_number: payload.whatsapp_number,
                position: payload.position,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AdminInfoResponse {
            user_id: admin.id,
            email: admin.email,
            password,
            school_id: payload.school_id,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/register/packages",
    tag = "Registration",
    responses(
        (status = 200, description = "Pacotes disponíveis", body = PackagesResponse)
    )
)]
pub async fn get_packages(
    State(app_state): State<AppState>,
) -> Result<Json<PackagesResponse>, AppError> {
    let packages = app_state.registration_service.list_packages().await?;
    Ok(Json(PackagesResponse { packages }))
}

// Etapa 3
#[utoipa::path(
    post,
    path = "/api/v1/register/select-package",
    tag = "Registration",
    request_body = SelectPackagePayload,
    responses(
        (status = 200, description = "Pacote aplicado à escola", body = SchoolResponse),
        (status = 404, description = "Escola ou pacote não encontrado")
    )
)]
pub async fn select_package(
    State(app_state): State<AppState>,
    Json(payload): Json<SelectPackagePayload>,
) -> Result<Json<SchoolResponse>, AppError> {
    let school = app_state
        .registration_service
        .select_package(payload.school_id, payload.package_id)
        .await?;
    Ok(Json(SchoolResponse { school }))
}

// Etapa 4
#[utoipa::path(
    post,
    path = "/api/v1/register/email-verification/request-otp",
    tag = "Registration",
    request_body = RequestOtpPayload,
    responses(
        (status = 200, description = "Código enviado por e-mail", body = MessageResponse),
        (status = 404, description = "Usuário não encontrado"),
        (status = 500, description = "Falha no envio do e-mail")
    )
)]
pub async fn request_otp(
    State(app_state): State<AppState>,
    Json(payload): Json<RequestOtpPayload>,
) -> Result<Json<MessageResponse>, AppError> {
    app_state
        .registration_service
        .request_email_verification_otp(payload.user_id)
        .await?;

    Ok(Json(MessageResponse {
        message: "Código de verificação enviado.".to_string(),
    }))
}

// Etapa 5
#[utoipa::path(
    post,
    path = "/api/v1/register/email-verification/verify-otp",
    tag = "Registration",
    request_body = VerifyOtpPayload,
    responses(
        (status = 200, description = "E-mail verificado", body = MessageResponse),
        (status = 400, description = "Código inválido"),
        (status = 409, description = "Código já usado ou substituído"),
        (status = 410, description = "Código expirado"),
        (status = 429, description = "Tentativas esgotadas")
    )
)]
pub async fn verify_otp(
    State(app_state): State<AppState>,
    Json(payload): Json<VerifyOtpPayload>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;

    app_state
        .registration_service
        .verify_email_otp(payload.user_id, &payload.otp)
        .await?;

    Ok(Json(MessageResponse {
        message: "E-mail verificado com sucesso.".to_string(),
    }))
}

// Etapa 6
#[utoipa::path(
    post,
    path = "/api/v1/register/complete",
    tag = "Registration",
    request_body = CompleteRegistrationPayload,
    responses(
        (status = 200, description = "Cadastro concluído", body = SchoolResponse),
        (status = 409, description = "Administrador ausente ou e-mail não verificado")
    )
)]
pub async fn complete(
    State(app_state): State<AppState>,
    Json(payload): Json<CompleteRegistrationPayload>,
) -> Result<Json<SchoolResponse>, AppError> {
    let school = app_state
        .registration_service
        .complete_registration(payload.school_id)
        .await?;
    Ok(Json(SchoolResponse { school }))
}

#[utoipa::path(
    get,
    path = "/api/v1/register/status/{school_id}",
    tag = "Registration",
    params(
        ("school_id" = Uuid, Path, description = "ID da Escola")
    ),
    responses(
        (status = 200, description = "Etapa atual do cadastro", body = RegistrationStatusResponse),
        (status = 404, description = "Escola não encontrada")
    )
)]
pub async fn status(
    State(app_state): State<AppState>,
    Path(school_id): Path<Uuid>,
) -> Result<Json<RegistrationStatusResponse>, AppError> {
    let state = app_state
        .registration_service
        .registration_status(school_id)
        .await?;
    Ok(Json(RegistrationStatusResponse { school_id, state }))
}
