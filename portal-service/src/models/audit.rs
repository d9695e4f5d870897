//! Audit log entries: who did what, when.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::Role;

/// A single audit event as persisted.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: Uuid,
    pub account_id: Uuid,
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(account_id: Uuid, action: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            action,
            timestamp: Utc::now(),
        }
    }
}

/// Audit event joined with its actor, as returned by the listing endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LogRecord {
    pub id: Uuid,
    #[serde(rename = "usuario_id")]
    pub account_id: Uuid,
    #[serde(rename = "acao")]
    pub action: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "usuario")]
    pub actor: Option<LogActor>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LogActor {
    pub id: Uuid,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Filter for log listings. `account_ids: Some(vec![])` matches nothing,
/// which is how an out-of-scope caller-supplied filter resolves.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub account_ids: Option<Vec<Uuid>>,
    pub action: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}
