// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::profile,

        // --- Registration ---
        handlers::registration::register_school_info,
        handlers::registration::register_admin_info,
        handlers::registration::get_packages,
        handlers::registration::select_package,
        handlers::registration::request_otp,
        handlers::registration::verify_otp,
        handlers::registration::complete,
        handlers::registration::status,

        // --- Users ---
        handlers::users::create_user,
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::delete_user,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::ProfileResponse,
            models::auth::MessageResponse,

            // --- Escola e pacotes ---
            models::school::EducationLevel,
            models::school::SchoolStatus,
            models::school::School,
            models::package::Package,
            models::role::Role,

            // --- Registration ---
            models::registration::RegistrationState,
            models::registration::SchoolInfoResponse,
            models::registration::AdminInfoResponse,
            models::registration::PackagesResponse,
            models::registration::SchoolResponse,
            models::registration::RegistrationStatusResponse,
            handlers::registration::RegisterSchoolInfoPayload,
            handlers::registration::RegisterAdminInfoPayload,
            handlers::registration::SelectPackagePayload,
            handlers::registration::RequestOtpPayload,
            handlers::registration::VerifyOtpPayload,
            handlers::registration::CompleteRegistrationPayload,

            // --- Users ---
            models::user::User,
            models::user::CreateUserPayload,
            models::user::UpdateUserPayload,
            handlers::users::UserResponse,
            handlers::users::UsersResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação"),
        (name = "Registration", description = "Cadastro de Escola em Etapas"),
        (name = "Users", description = "Perfil e Gestão de Usuários da Escola")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
