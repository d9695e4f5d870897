use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

/// Query-string filters for the audit trail; field names match the wire.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LogQuery {
    pub usuario_id: Option<Uuid>,
    pub acao: Option<String>,
    pub data_inicio: Option<DateTime<Utc>>,
    pub data_fim: Option<DateTime<Utc>>,
}
