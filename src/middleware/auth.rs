// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{auth::Claims, role::RoleName},
};

// Valida o Bearer token e guarda as claims nos "extensions" da requisição
pub async fn auth_guard(
    State(app_state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::InvalidToken)?;

    let claims = app_state.token_service.parse(bearer.token())?;
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

// Roda depois do auth_guard: só administradores passam
pub async fn require_admin(
    AuthenticatedUser(claims): AuthenticatedUser,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if claims.role != RoleName::Admin.as_str() {
        return Err(AppError::Forbidden("apenas administradores".into()));
    }
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::InvalidToken)
    }
}
