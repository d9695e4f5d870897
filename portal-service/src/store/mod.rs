//! Persistence boundary.
//!
//! The portal treats the relational store as an external collaborator behind
//! a trait object: services receive an `Arc<dyn Store>` at construction time,
//! so the backing implementation (Postgres in production, in-memory in tests)
//! is a wiring decision made once in `main`.

mod memory;
mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Account, AccountScope, ApprovalStatus, AuditEntry, Company, LogFilter, LogRecord,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Point lookups, inserts, and field-level updates used by the portal.
/// No multi-entity transactions are required; approval-state changes are
/// last-write-wins at the storage layer.
#[async_trait]
pub trait Store: Send + Sync {
    // Accounts
    async fn count_accounts(&self) -> Result<u64, StoreError>;
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError>;
    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;
    async fn list_accounts(&self, scope: &AccountScope) -> Result<Vec<Account>, StoreError>;
    async fn set_account_status(&self, id: Uuid, status: ApprovalStatus) -> Result<(), StoreError>;
    async fn set_account_company(&self, id: Uuid, company: Option<Uuid>) -> Result<(), StoreError>;
    async fn count_accounts_in_company(&self, company: Uuid) -> Result<u64, StoreError>;

    // Companies
    async fn insert_company(&self, company: &Company) -> Result<(), StoreError>;
    async fn find_company_by_id(&self, id: Uuid) -> Result<Option<Company>, StoreError>;
    async fn list_companies(&self) -> Result<Vec<Company>, StoreError>;
    async fn update_company(&self, company: &Company) -> Result<(), StoreError>;
    async fn delete_company(&self, id: Uuid) -> Result<(), StoreError>;

    // Audit log
    async fn insert_log(&self, entry: &AuditEntry) -> Result<(), StoreError>;
    async fn list_logs(&self, filter: &LogFilter) -> Result<Vec<LogRecord>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
