use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use portal_core::error::AppError;

use crate::{
    dtos::auth::{AccountEnvelope, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    utils::ValidatedJson,
    AppState,
};

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid input or email already in use"),
        (status = 429, description = "Too many attempts"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Autenticação"
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (account, first) = state.auth.register(req).await?;

    let message = if first {
        "Administrador criado com sucesso"
    } else {
        "Cadastro realizado com sucesso. Aguarde aprovação."
    };

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            status: "success".to_string(),
            message: message.to_string(),
            data: AccountEnvelope {
                usuario: account.sanitized(),
            },
        }),
    ))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Incorrect email or password"),
        (status = 403, description = "Account not approved"),
        (status = 429, description = "Too many attempts"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Autenticação"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (token, account) = state.auth.login(req).await?;

    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            status: "success".to_string(),
            token,
            data: AccountEnvelope {
                usuario: account.sanitized(),
            },
        }),
    ))
}
