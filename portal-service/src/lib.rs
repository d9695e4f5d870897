pub mod config;
pub mod db;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
    Json, Router,
};
use portal_core::error::AppError;
use portal_core::middleware::{
    rate_limit::{ip_rate_limit_middleware, IpRateLimiter},
    security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::PortalConfig;
use crate::services::{AccessGate, AuditRecorder, AuthService};
use crate::store::Store;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        handlers::auth::register,
        handlers::auth::login,
        handlers::user::me,
        handlers::user::list_users,
        handlers::user::get_user,
        handlers::user::approve_user,
        handlers::user::assign_company,
        handlers::company::list_companies,
        handlers::company::get_company,
        handlers::company::create_company,
        handlers::company::update_company,
        handlers::company::delete_company,
        handlers::log::list_logs,
        handlers::sample::sample_user,
        handlers::sample::sample_group,
    ),
    components(
        schemas(
            dtos::auth::RegisterRequest,
            dtos::auth::RegisterResponse,
            dtos::auth::LoginRequest,
            dtos::auth::LoginResponse,
            dtos::auth::AccountEnvelope,
            dtos::user::ApprovalDecision,
            dtos::user::ApprovalRequest,
            dtos::user::CompanyAssignmentRequest,
            dtos::company::CreateCompanyRequest,
            dtos::company::UpdateCompanyRequest,
            handlers::company::CompanyWithMembers,
            models::Role,
            models::ApprovalStatus,
            models::AccountSummary,
            models::Company,
            models::LogRecord,
            models::LogActor,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Autenticação", description = "Registro e login"),
        (name = "Usuários", description = "Contas, aprovação e associação a empresas"),
        (name = "Empresas", description = "Cadastro de empresas"),
        (name = "Logs", description = "Trilha de auditoria"),
        (name = "Simulação", description = "Payloads IAM estáticos"),
        (name = "Observability", description = "Service health"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PortalConfig>,
    pub store: Arc<dyn Store>,
    pub auth: AuthService,
    pub gate: AccessGate,
    pub audit: AuditRecorder,
    pub login_rate_limiter: IpRateLimiter,
    pub register_rate_limiter: IpRateLimiter,
}

pub fn build_router(state: AppState) -> Router {
    // Public routes, each behind its own IP limiter.
    let login_route = Router::new()
        .route("/api/login", post(handlers::auth::login))
        .layer(from_fn_with_state(
            state.login_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ));
    let register_route = Router::new()
        .route("/api/register", post(handlers::auth::register))
        .layer(from_fn_with_state(
            state.register_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ));

    // Everything else requires a resolved caller.
    let protected_routes = Router::new()
        .route("/api/usuarios/me", get(handlers::user::me))
        .route("/api/usuarios", get(handlers::user::list_users))
        .route("/api/usuarios/:id", get(handlers::user::get_user))
        .route(
            "/api/usuarios/:id/aprovar",
            patch(handlers::user::approve_user),
        )
        .route(
            "/api/usuarios/:id/empresa",
            patch(handlers::user::assign_company),
        )
        .route(
            "/api/empresas",
            get(handlers::company::list_companies).post(handlers::company::create_company),
        )
        .route(
            "/api/empresas/:id",
            get(handlers::company::get_company)
                .put(handlers::company::update_company)
                .delete(handlers::company::delete_company),
        )
        .route("/api/logs", get(handlers::log::list_logs))
        .route(
            "/api/simulacao-json/usuario",
            get(handlers::sample::sample_user),
        )
        .route(
            "/api/simulacao-json/grupo",
            get(handlers::sample::sample_group),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .security
                .allowed_origins
                .iter()
                .filter_map(|origin| {
                    origin
                        .parse::<HeaderValue>()
                        .map_err(|e| {
                            tracing::error!(origin = %origin, error = %e, "invalid CORS origin, skipping");
                            e
                        })
                        .ok()
                })
                .collect::<Vec<_>>(),
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_check))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(login_route)
        .merge(register_route)
        .merge(protected_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            },
        ))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
}

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 500, description = "Store unreachable")
    ),
    tag = "Observability"
)]
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.store.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "store health check failed");
        AppError::DatabaseError(anyhow::anyhow!(e))
    })?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "checks": { "store": "up" }
    })))
}
