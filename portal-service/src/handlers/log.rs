use axum::{extract::{Query, State}, response::IntoResponse, Json};
use portal_core::error::AppError;
use serde_json::json;
use uuid::Uuid;

use crate::{
    dtos::log::LogQuery,
    middleware::CurrentAccount,
    models::{Account, AccountScope, LogFilter, Role},
    services::ServiceError,
    AppState,
};

/// List audit-log entries visible to the caller
///
/// The caller-supplied `usuario_id` filter is intersected with the caller's
/// scope: asking about an account outside it yields an empty result rather
/// than an error, so the endpoint never confirms what exists beyond the
/// caller's view.
#[utoipa::path(
    get,
    path = "/api/logs",
    params(LogQuery),
    responses(
        (status = 200, description = "Scoped audit trail, newest first"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Logs",
    security(("bearer_auth" = []))
)]
pub async fn list_logs(
    State(state): State<AppState>,
    CurrentAccount(caller): CurrentAccount,
    Query(query): Query<LogQuery>,
) -> Result<impl IntoResponse, AppError> {
    let account_ids = visible_account_ids(&state, &caller, query.usuario_id).await?;

    let filter = LogFilter {
        account_ids,
        action: query.acao,
        from: query.data_inicio,
        until: query.data_fim,
    };

    let logs = state
        .store
        .list_logs(&filter)
        .await
        .map_err(ServiceError::from)?;

    Ok(Json(json!({
        "status": "success",
        "results": logs.len(),
        "data": { "logs": logs }
    })))
}

/// Resolves the id filter for the caller's role. `None` means unrestricted;
/// `Some(vec![])` matches nothing.
async fn visible_account_ids(
    state: &AppState,
    caller: &Account,
    requested: Option<Uuid>,
) -> Result<Option<Vec<Uuid>>, AppError> {
    let visible = match caller.role {
        Role::Admin => return Ok(requested.map(|id| vec![id])),
        Role::Manager => {
            let colleagues = state
                .store
                .list_accounts(&AccountScope::Company(caller.company_id))
                .await
                .map_err(ServiceError::from)?;
            colleagues.into_iter().map(|a| a.id).collect::<Vec<_>>()
        }
        Role::Operator => vec![caller.id],
    };

    Ok(Some(match requested {
        Some(id) if visible.contains(&id) => vec![id],
        Some(_) => vec![],
        None => visible,
    }))
}
