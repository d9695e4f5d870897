use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use portal_core::error::AppError;
use serde_json::json;
use uuid::Uuid;

use crate::{
    dtos::user::{ApprovalDecision, ApprovalRequest, CompanyAssignmentRequest},
    middleware::CurrentAccount,
    models::{ApprovalStatus, Role},
    services::ServiceError,
    utils::ValidatedJson,
    AppState,
};

/// Current caller's own record
#[utoipa::path(
    get,
    path = "/api/usuarios/me",
    responses(
        (status = 200, description = "Caller's sanitized record"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Usuários",
    security(("bearer_auth" = []))
)]
pub async fn me(CurrentAccount(caller): CurrentAccount) -> impl IntoResponse {
    Json(json!({
        "status": "success",
        "data": { "usuario": caller.sanitized() }
    }))
}

/// List accounts visible to the caller
#[utoipa::path(
    get,
    path = "/api/usuarios",
    responses(
        (status = 200, description = "Scoped account listing"),
        (status = 403, description = "Insufficient permission")
    ),
    tag = "Usuários",
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    CurrentAccount(caller): CurrentAccount,
) -> Result<impl IntoResponse, AppError> {
    state
        .gate
        .require_role(&caller, &[Role::Admin, Role::Manager])?;

    let scope = state.gate.listing_scope(&caller);
    let accounts = state
        .store
        .list_accounts(&scope)
        .await
        .map_err(ServiceError::from)?;
    let usuarios: Vec<_> = accounts.iter().map(|a| a.sanitized()).collect();

    state.audit.record(caller.id, "Listagem de usuários");

    Ok(Json(json!({
        "status": "success",
        "results": usuarios.len(),
        "data": { "usuarios": usuarios }
    })))
}

/// Fetch one account, subject to the same-company rule
#[utoipa::path(
    get,
    path = "/api/usuarios/{id}",
    params(("id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 200, description = "Sanitized target account"),
        (status = 403, description = "Insufficient permission"),
        (status = 404, description = "Account not found")
    ),
    tag = "Usuários",
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    CurrentAccount(caller): CurrentAccount,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let target = state.gate.authorize_target(&caller, id).await?;

    state
        .audit
        .record(caller.id, format!("Visualização do usuário {}", target.id));

    Ok(Json(json!({
        "status": "success",
        "data": { "usuario": target.sanitized() }
    })))
}

/// Approve or reject a pending account
#[utoipa::path(
    patch,
    path = "/api/usuarios/{id}/aprovar",
    params(("id" = Uuid, Path, description = "Account id")),
    request_body = ApprovalRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Status other than aprovado/rejeitado"),
        (status = 403, description = "Insufficient permission"),
        (status = 404, description = "Account not found")
    ),
    tag = "Usuários",
    security(("bearer_auth" = []))
)]
pub async fn approve_user(
    State(state): State<AppState>,
    CurrentAccount(caller): CurrentAccount,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ApprovalRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .gate
        .require_role(&caller, &[Role::Admin, Role::Manager])?;

    let mut target = state.gate.authorize_target(&caller, id).await?;

    let status = ApprovalStatus::from(req.status);
    state
        .store
        .set_account_status(target.id, status)
        .await
        .map_err(ServiceError::from)?;
    target.status = status;

    let (action, outcome) = match req.status {
        ApprovalDecision::Approved => ("Aprovação", "aprovado"),
        ApprovalDecision::Rejected => ("Rejeição", "rejeitado"),
    };
    state
        .audit
        .record(caller.id, format!("{} do usuário {}", action, target.id));

    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "message": format!("Usuário {} com sucesso", outcome),
            "data": { "usuario": target.sanitized() }
        })),
    ))
}

/// Associate an account with a company (or clear the association)
#[utoipa::path(
    patch,
    path = "/api/usuarios/{id}/empresa",
    params(("id" = Uuid, Path, description = "Account id")),
    request_body = CompanyAssignmentRequest,
    responses(
        (status = 200, description = "Association updated"),
        (status = 403, description = "Insufficient permission"),
        (status = 404, description = "Account or company not found")
    ),
    tag = "Usuários",
    security(("bearer_auth" = []))
)]
pub async fn assign_company(
    State(state): State<AppState>,
    CurrentAccount(caller): CurrentAccount,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<CompanyAssignmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.gate.require_role(&caller, &[Role::Admin])?;

    let mut target = state
        .store
        .find_account_by_id(id)
        .await
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::AccountNotFound)?;

    if let Some(company_id) = req.company_id {
        state
            .store
            .find_company_by_id(company_id)
            .await
            .map_err(ServiceError::from)?
            .ok_or(ServiceError::CompanyNotFound)?;
    }

    state
        .store
        .set_account_company(target.id, req.company_id)
        .await
        .map_err(ServiceError::from)?;
    target.company_id = req.company_id;

    let company_label = req
        .company_id
        .map(|c| c.to_string())
        .unwrap_or_else(|| "nenhuma".to_string());
    state.audit.record(
        caller.id,
        format!("Associação do usuário {} à empresa {}", target.id, company_label),
    );

    Ok(Json(json!({
        "status": "success",
        "message": "Usuário associado à empresa com sucesso",
        "data": { "usuario": target.sanitized() }
    })))
}
