use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{AuthResponse, LoginUserPayload, MessageResponse, ProfileResponse},
};

// Handler de login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login bem-sucedido", body = AuthResponse),
        (status = 401, description = "E-mail ou senha inválidos")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginUserPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let token = app_state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(AuthResponse { token }))
}

// O token não é revogado; o cliente apenas o descarta.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Logout confirmado", body = MessageResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn logout(AuthenticatedUser(claims): AuthenticatedUser) -> Json<MessageResponse> {
    tracing::info!(user_id = %claims.sub, "Logout");
    Json(MessageResponse {
        message: "Logout realizado com sucesso.".to_string(),
    })
}

// Handler da rota protegida /profile
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    tag = "Users",
    responses(
        (status = 200, description = "Perfil do usuário logado", body = ProfileResponse),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn profile(
    State(app_state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let (user, school) = app_state.auth_service.get_user_profile(claims.sub).await?;
    Ok(Json(ProfileResponse { user, school }))
}
