// src/handlers/users.rs
//
// Área administrativa de usuários. Todas as rotas passam por auth_guard e require_admin.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::MessageResponse,
        user::{CreateUserPayload, ListUsersQuery, UpdateUserPayload, User},
    },
    services::user_service::UserChanges,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Professor ou aluno criado", body = UserResponse),
        (status = 400, description = "Cargo inválido"),
        (status = 409, description = "E-mail já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(payload): Json<CreateUserPayload>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    payload.validate()?;

    let user = app_state
        .user_service
        .create_teacher_or_student(
            &payload.name,
            &payload.email,
            &payload.password,
            &payload.role,
            claims.sub,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse { user })))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "Users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Usuários visíveis para o administrador", body = UsersResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<UsersResponse>, AppError> {
    let users = app_state
        .user_service
        .get_all_users(query.role.as_deref(), claims.sub)
        .await?;
    Ok(Json(UsersResponse { users }))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "ID do Usuário")
    ),
    responses(
        (status = 200, description = "Usuário encontrado", body = UserResponse),
        (status = 403, description = "Usuário de outra escola"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let user = app_state.user_service.get_user_by_id(id, claims.sub).await?;
    Ok(Json(UserResponse { user }))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}",
    tag = "Users",
    request_body = UpdateUserPayload,
    params(
        ("id" = Uuid, Path, description = "ID do Usuário")
    ),
    responses(
        (status = 200, description = "Usuário atualizado", body = UserResponse),
        (status = 403, description = "Usuário de outra escola"),
        (status = 409, description = "E-mail já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate()?;

    let user = app_state
        .user_service
        .update_user(
            id,
            claims.sub,
            UserChanges {
                name: payload.name,
                email: payload.email,
                role: payload.role,
            },
        )
        .await?;
    Ok(Json(UserResponse { user }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "ID do Usuário")
    ),
    responses(
        (status = 200, description = "Usuário excluído", body = MessageResponse),
        (status = 403, description = "Outra escola ou o próprio administrador")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    app_state.user_service.delete_user(id, claims.sub).await?;
    Ok(Json(MessageResponse {
        message: "Usuário excluído com sucesso.".to_string(),
    }))
}
