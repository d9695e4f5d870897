use std::sync::Arc;
use uuid::Uuid;

use crate::models::AuditEntry;
use crate::store::Store;

/// Fire-and-forget audit logging.
///
/// A failed write must never fail the request that triggered it: the insert
/// runs on a spawned task and errors only reach the server log.
#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn Store>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn record(&self, account_id: Uuid, action: impl Into<String>) {
        let entry = AuditEntry::new(account_id, action.into());
        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(e) = store.insert_log(&entry).await {
                tracing::warn!(error = %e, account_id = %entry.account_id, "audit log write failed");
            }
        });
    }
}
