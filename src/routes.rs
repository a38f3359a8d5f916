// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::auth::{auth_guard, require_admin},
};

pub fn app(app_state: AppState) -> Router {
    // Rotas de autenticação
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .merge(
            Router::new()
                .route("/logout", post(handlers::auth::logout))
                .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard)),
        );

    let profile_routes = Router::new()
        .route("/profile", get(handlers::auth::profile))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Cadastro de escola (público)
    let registration_routes = Router::new()
        .route("/school-info", post(handlers::registration::register_school_info))
        .route("/admin-info", post(handlers::registration::register_admin_info))
        .route("/packages", get(handlers::registration::get_packages))
        .route("/select-package", post(handlers::registration::select_package))
        .route("/email-verification/request-otp", post(handlers::registration::request_otp))
        .route("/email-verification/verify-otp", post(handlers::registration::verify_otp))
        .route("/complete", post(handlers::registration::complete))
        .route("/status/{school_id}", get(handlers::registration::status));

    // Área administrativa: auth_guard roda antes de require_admin
    let admin_routes = Router::new()
        .route(
            "/users",
            post(handlers::users::create_user).get(handlers::users::list_users),
        )
        .route(
            "/users/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .layer(axum_middleware::from_fn(require_admin))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let api = Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/auth", auth_routes)
        .merge(profile_routes)
        .nest("/register", registration_routes)
        .nest("/admin", admin_routes);

    Router::new()
        .nest("/api/v1", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::test_support::{self, MASTER_EMAIL, MASTER_PASSWORD};

    async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn login(app: &Router, email: &str, password: &str) -> String {
        let (status, body) = call(
            app,
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_is_public() {
        let (state, _) = test_support::app_state().await;
        let app = app(state);

        let response = app
            .oneshot(Request::builder().uri("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_require_token() {
        let (state, _) = test_support::app_state().await;
        let app = app(state);

        let (status, _) = call(&app, Method::GET, "/api/v1/profile", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(&app, Method::GET, "/api/v1/admin/users", Some("lixo"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": MASTER_EMAIL, "password": "errada" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "E-mail ou senha inválidos.");
    }

    #[tokio::test]
    async fn invalid_payload_reports_field_details() {
        let (state, _) = test_support::app_state().await;
        let app = app(state);

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/register/school-info",
            None,
            Some(json!({
                "name": "Barniee Academy",
                "educationLevel": "SMA",
                "status": "Swasta",
                "address": "Jl. Inovasi No. 10",
                "initialStudentCount": 0
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["initial_student_count"].is_array());
    }

    #[tokio::test]
    async fn onboarding_over_http_then_admin_manages_users() {
        let (state, mailer) = test_support::app_state().await;
        let app = app(state);

        let (status, packages) = call(&app, Method::GET, "/api/v1/register/packages", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let trial_id = packages["packages"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["name"] == "Free Trial")
            .unwrap()["id"]
            .clone();

        let (status, school) = call(
            &app,
            Method::POST,
            "/api/v1/register/school-info",
            None,
            Some(json!({
                "name": "Barniee Academy",
                "educationLevel": "SMA",
                "status": "Swasta",
                "address": "Jl. Inovasi No. 10",
                "initialStudentCount": 150
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let school_id = school["schoolId"].as_str().unwrap().to_string();

        let (status, admin) = call(
            &app,
            Method::POST,
            "/api/v1/register/admin-info",
            None,
            Some(json!({
                "schoolId": school_id,
                "adminName": "Siti Aminah",
                "adminEmail": "siti@example.com",
                "whatsappNumber": "081234567890",
                "position": "Direktur"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let admin_id = admin["userId"].as_str().unwrap().to_string();
        let admin_password = admin["password"].as_str().unwrap().to_string();

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/register/complete",
            None,
            Some(json!({ "schoolId": school_id })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/register/select-package",
            None,
            Some(json!({ "schoolId": school_id, "packageId": trial_id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/register/email-verification/request-otp",
            None,
            Some(json!({ "userId": admin_id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let otp = mailer.last_otp().await.unwrap();
        let verify = json!({ "userId": admin_id, "otp": otp });
        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/register/email-verification/verify-otp",
            None,
            Some(verify.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/register/email-verification/verify-otp",
            None,
            Some(verify),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, done) = call(
            &app,
            Method::POST,
            "/api/v1/register/complete",
            None,
            Some(json!({ "schoolId": school_id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(done["school"]["subscriptionEndDate"].is_string());

        let (status, progress) = call(
            &app,
            Method::GET,
            &format!("/api/v1/register/status/{school_id}"),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(progress["state"], "Completed");

        // O administrador recém-criado entra com a senha gerada
        let token = login(&app, "siti@example.com", &admin_password).await;

        let (status, profile) = call(&app, Method::GET, "/api/v1/profile", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["school"]["id"], school_id.as_str());
        assert!(profile["user"].get("passwordHash").is_none());

        let (status, created) = call(
            &app,
            Method::POST,
            "/api/v1/admin/users",
            Some(&token),
            Some(json!({
                "name": "Budi",
                "email": "budi@example.com",
                "password": "rahasia1",
                "role": "teacher"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["user"]["schoolId"], school_id.as_str());
        let teacher_id = created["user"]["id"].as_str().unwrap().to_string();

        // Professor não acessa a área administrativa
        let teacher_token = login(&app, "budi@example.com", "rahasia1").await;
        let (status, _) = call(&app, Method::GET, "/api/v1/admin/users", Some(&teacher_token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, listed) = call(&app, Method::GET, "/api/v1/admin/users?role=teacher", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["users"].as_array().unwrap().len(), 1);

        // O master admin fora da escola vê todos
        let master_token = login(&app, MASTER_EMAIL, MASTER_PASSWORD).await;
        let (status, everyone) = call(&app, Method::GET, "/api/v1/admin/users", Some(&master_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(everyone["users"].as_array().unwrap().len(), 3);

        let (status, _) = call(
            &app,
            Method::DELETE,
            &format!("/api/v1/admin/users/{admin_id}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(
            &app,
            Method::DELETE,
            &format!("/api/v1/admin/users/{teacher_id}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&app, Method::POST, "/api/v1/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
