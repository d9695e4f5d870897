//! Canned cloud-IAM payloads used by integration partners to exercise their
//! parsers without touching real directory data. The literals are fixed;
//! nothing here reads the store.

use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Sample IAM user payload
#[utoipa::path(
    get,
    path = "/api/simulacao-json/usuario",
    responses((status = 200, description = "Static IAM user payload")),
    tag = "Simulação",
    security(("bearer_auth" = []))
)]
pub async fn sample_user() -> impl IntoResponse {
    Json(json!({
        "id": "usr_123456",
        "displayName": "Usuário de Exemplo",
        "email": "usuario@exemplo.com",
        "groups": [
            { "id": "grp_001", "name": "Grupo Financeiro" },
            { "id": "grp_002", "name": "Grupo Administrativo" }
        ],
        "attributes": {
            "departamento": "TI",
            "cargo": "Analista",
            "dataAdmissao": "2023-01-15"
        },
        "active": true,
        "createdAt": "2023-01-10T08:30:00Z",
        "lastLogin": "2023-06-20T14:45:30Z"
    }))
}

/// Sample IAM group payload
#[utoipa::path(
    get,
    path = "/api/simulacao-json/grupo",
    responses((status = 200, description = "Static IAM group payload")),
    tag = "Simulação",
    security(("bearer_auth" = []))
)]
pub async fn sample_group() -> impl IntoResponse {
    Json(json!({
        "id": "grp_001",
        "name": "Grupo Financeiro",
        "description": "Grupo para usuários do departamento financeiro",
        "members": [
            {
                "id": "usr_123456",
                "displayName": "Usuário de Exemplo",
                "email": "usuario@exemplo.com"
            },
            {
                "id": "usr_789012",
                "displayName": "Outro Usuário",
                "email": "outro@exemplo.com"
            }
        ],
        "permissions": [
            "ler_relatorios",
            "aprovar_despesas",
            "visualizar_dashboards"
        ],
        "createdAt": "2023-01-05T10:15:00Z",
        "updatedAt": "2023-05-12T16:20:00Z",
        "active": true
    }))
}
