use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use portal_core::error::AppError;
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dtos::company::{CreateCompanyRequest, UpdateCompanyRequest},
    middleware::CurrentAccount,
    models::{AccountScope, AccountSummary, Company, Role},
    services::ServiceError,
    utils::ValidatedJson,
    AppState,
};

/// Company plus its member accounts, as the detail endpoint returns it.
#[derive(Debug, Serialize, ToSchema)]
pub struct CompanyWithMembers {
    #[serde(flatten)]
    pub company: Company,
    pub usuarios: Vec<AccountSummary>,
}

/// List companies
#[utoipa::path(
    get,
    path = "/api/empresas",
    responses(
        (status = 200, description = "All companies"),
        (status = 403, description = "Insufficient permission")
    ),
    tag = "Empresas",
    security(("bearer_auth" = []))
)]
pub async fn list_companies(
    State(state): State<AppState>,
    CurrentAccount(caller): CurrentAccount,
) -> Result<impl IntoResponse, AppError> {
    state
        .gate
        .require_role(&caller, &[Role::Admin, Role::Manager])?;

    let empresas = state
        .store
        .list_companies()
        .await
        .map_err(ServiceError::from)?;

    state.audit.record(caller.id, "Listagem de empresas");

    Ok(Json(json!({
        "status": "success",
        "results": empresas.len(),
        "data": { "empresas": empresas }
    })))
}

/// Fetch one company with its member accounts
#[utoipa::path(
    get,
    path = "/api/empresas/{id}",
    params(("id" = Uuid, Path, description = "Company id")),
    responses(
        (status = 200, description = "Company detail", body = CompanyWithMembers),
        (status = 403, description = "Insufficient permission"),
        (status = 404, description = "Company not found")
    ),
    tag = "Empresas",
    security(("bearer_auth" = []))
)]
pub async fn get_company(
    State(state): State<AppState>,
    CurrentAccount(caller): CurrentAccount,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state
        .gate
        .require_role(&caller, &[Role::Admin, Role::Manager])?;

    let company = state
        .store
        .find_company_by_id(id)
        .await
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::CompanyNotFound)?;

    let members = state
        .store
        .list_accounts(&AccountScope::Company(Some(company.id)))
        .await
        .map_err(ServiceError::from)?;

    state
        .audit
        .record(caller.id, format!("Visualização da empresa {}", company.id));

    let detail = CompanyWithMembers {
        company,
        usuarios: members.iter().map(|a| a.sanitized()).collect(),
    };

    Ok(Json(json!({
        "status": "success",
        "data": { "empresa": detail }
    })))
}

/// Create a company
#[utoipa::path(
    post,
    path = "/api/empresas",
    request_body = CreateCompanyRequest,
    responses(
        (status = 201, description = "Company created"),
        (status = 403, description = "Insufficient permission")
    ),
    tag = "Empresas",
    security(("bearer_auth" = []))
)]
pub async fn create_company(
    State(state): State<AppState>,
    CurrentAccount(caller): CurrentAccount,
    ValidatedJson(req): ValidatedJson<CreateCompanyRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.gate.require_role(&caller, &[Role::Admin])?;

    let company = Company::new(req.name, req.location);
    state
        .store
        .insert_company(&company)
        .await
        .map_err(ServiceError::from)?;

    state
        .audit
        .record(caller.id, format!("Criação da empresa {}", company.id));

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "data": { "empresa": company }
        })),
    ))
}

/// Update a company (partial)
#[utoipa::path(
    put,
    path = "/api/empresas/{id}",
    params(("id" = Uuid, Path, description = "Company id")),
    request_body = UpdateCompanyRequest,
    responses(
        (status = 200, description = "Company updated"),
        (status = 403, description = "Insufficient permission"),
        (status = 404, description = "Company not found")
    ),
    tag = "Empresas",
    security(("bearer_auth" = []))
)]
pub async fn update_company(
    State(state): State<AppState>,
    CurrentAccount(caller): CurrentAccount,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateCompanyRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.gate.require_role(&caller, &[Role::Admin])?;

    let mut company = state
        .store
        .find_company_by_id(id)
        .await
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::CompanyNotFound)?;

    if let Some(name) = req.name {
        company.name = name;
    }
    if let Some(location) = req.location {
        company.location = Some(location);
    }

    state
        .store
        .update_company(&company)
        .await
        .map_err(ServiceError::from)?;

    state
        .audit
        .record(caller.id, format!("Atualização da empresa {}", company.id));

    Ok(Json(json!({
        "status": "success",
        "data": { "empresa": company }
    })))
}

/// Delete a company with no member accounts
#[utoipa::path(
    delete,
    path = "/api/empresas/{id}",
    params(("id" = Uuid, Path, description = "Company id")),
    responses(
        (status = 204, description = "Company deleted"),
        (status = 400, description = "Accounts still reference the company"),
        (status = 403, description = "Insufficient permission"),
        (status = 404, description = "Company not found")
    ),
    tag = "Empresas",
    security(("bearer_auth" = []))
)]
pub async fn delete_company(
    State(state): State<AppState>,
    CurrentAccount(caller): CurrentAccount,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.gate.require_role(&caller, &[Role::Admin])?;

    let company = state
        .store
        .find_company_by_id(id)
        .await
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::CompanyNotFound)?;

    let members = state
        .store
        .count_accounts_in_company(company.id)
        .await
        .map_err(ServiceError::from)?;
    if members > 0 {
        return Err(ServiceError::CompanyInUse.into());
    }

    state
        .store
        .delete_company(company.id)
        .await
        .map_err(ServiceError::from)?;

    state
        .audit
        .record(caller.id, format!("Exclusão da empresa {}", company.id));

    Ok(StatusCode::NO_CONTENT)
}
