//! Postgres-backed store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPool, FromRow, QueryBuilder};
use uuid::Uuid;

use super::{Store, StoreError};
use crate::models::{
    Account, AccountScope, ApprovalStatus, AuditEntry, Company, LogActor, LogFilter, LogRecord,
};
use crate::utils::PasswordHashString;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw row shape; role/status come back as text and are parsed into the
/// closed enums on the way out.
#[derive(FromRow)]
struct AccountRow {
    id: Uuid,
    nome: String,
    email: String,
    senha_hash: String,
    role: String,
    status: String,
    empresa_id: Option<Uuid>,
    criado_em: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, StoreError> {
        Ok(Account {
            id: row.id,
            name: row.nome,
            email: row.email,
            password_hash: PasswordHashString::new(row.senha_hash),
            role: row.role.parse().map_err(StoreError::Corrupt)?,
            status: row.status.parse().map_err(StoreError::Corrupt)?,
            company_id: row.empresa_id,
            created_at: row.criado_em,
        })
    }
}

#[derive(FromRow)]
struct CompanyRow {
    id: Uuid,
    nome: String,
    localizacao: Option<String>,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Company {
            id: row.id,
            name: row.nome,
            location: row.localizacao,
        }
    }
}

#[derive(FromRow)]
struct LogRow {
    id: Uuid,
    usuario_id: Uuid,
    acao: String,
    timestamp: DateTime<Utc>,
    actor_id: Option<Uuid>,
    actor_nome: Option<String>,
    actor_email: Option<String>,
    actor_role: Option<String>,
}

impl TryFrom<LogRow> for LogRecord {
    type Error = StoreError;

    fn try_from(row: LogRow) -> Result<Self, StoreError> {
        let actor = match (row.actor_id, row.actor_nome, row.actor_email, row.actor_role) {
            (Some(id), Some(name), Some(email), Some(role)) => Some(LogActor {
                id,
                name,
                email,
                role: role.parse().map_err(StoreError::Corrupt)?,
            }),
            _ => None,
        };
        Ok(LogRecord {
            id: row.id,
            account_id: row.usuario_id,
            action: row.acao,
            timestamp: row.timestamp,
            actor,
        })
    }
}

const ACCOUNT_COLUMNS: &str = "id, nome, email, senha_hash, role, status, empresa_id, criado_em";

#[async_trait]
impl Store for PgStore {
    async fn count_accounts(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM usuarios")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO usuarios (id, nome, email, senha_hash, role, status, empresa_id, criado_em) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(account.id)
        .bind(&account.name)
        .bind(&account.email)
        .bind(account.password_hash.as_str())
        .bind(account.role.as_str())
        .bind(account.status.as_str())
        .bind(account.company_id)
        .bind(account.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM usuarios WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Account::try_from).transpose()
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        // Exact, case-sensitive match on the stored value.
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM usuarios WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Account::try_from).transpose()
    }

    async fn list_accounts(&self, scope: &AccountScope) -> Result<Vec<Account>, StoreError> {
        let mut qb = QueryBuilder::new(format!("SELECT {ACCOUNT_COLUMNS} FROM usuarios"));
        match scope {
            AccountScope::All => {}
            AccountScope::Company(Some(company_id)) => {
                qb.push(" WHERE empresa_id = ").push_bind(*company_id);
            }
            AccountScope::Company(None) => {
                qb.push(" WHERE empresa_id IS NULL");
            }
            AccountScope::Own(id) => {
                qb.push(" WHERE id = ").push_bind(*id);
            }
        }
        qb.push(" ORDER BY criado_em");

        let rows: Vec<AccountRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(Account::try_from).collect()
    }

    async fn set_account_status(&self, id: Uuid, status: ApprovalStatus) -> Result<(), StoreError> {
        sqlx::query("UPDATE usuarios SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_account_company(&self, id: Uuid, company: Option<Uuid>) -> Result<(), StoreError> {
        sqlx::query("UPDATE usuarios SET empresa_id = $1 WHERE id = $2")
            .bind(company)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_accounts_in_company(&self, company: Uuid) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM usuarios WHERE empresa_id = $1")
            .bind(company)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn insert_company(&self, company: &Company) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO empresas (id, nome, localizacao) VALUES ($1, $2, $3)")
            .bind(company.id)
            .bind(&company.name)
            .bind(&company.location)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_company_by_id(&self, id: Uuid) -> Result<Option<Company>, StoreError> {
        let row: Option<CompanyRow> =
            sqlx::query_as("SELECT id, nome, localizacao FROM empresas WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Company::from))
    }

    async fn list_companies(&self) -> Result<Vec<Company>, StoreError> {
        let rows: Vec<CompanyRow> =
            sqlx::query_as("SELECT id, nome, localizacao FROM empresas ORDER BY nome")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Company::from).collect())
    }

    async fn update_company(&self, company: &Company) -> Result<(), StoreError> {
        sqlx::query("UPDATE empresas SET nome = $1, localizacao = $2 WHERE id = $3")
            .bind(&company.name)
            .bind(&company.location)
            .bind(company.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_company(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM empresas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_log(&self, entry: &AuditEntry) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO logs (id, usuario_id, acao, timestamp) VALUES ($1, $2, $3, $4)")
            .bind(entry.id)
            .bind(entry.account_id)
            .bind(&entry.action)
            .bind(entry.timestamp)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_logs(&self, filter: &LogFilter) -> Result<Vec<LogRecord>, StoreError> {
        let mut qb = QueryBuilder::new(
            "SELECT l.id, l.usuario_id, l.acao, l.timestamp, \
             u.id AS actor_id, u.nome AS actor_nome, u.email AS actor_email, u.role AS actor_role \
             FROM logs l LEFT JOIN usuarios u ON u.id = l.usuario_id WHERE TRUE",
        );
        if let Some(ids) = &filter.account_ids {
            qb.push(" AND l.usuario_id = ANY(").push_bind(ids.clone()).push(")");
        }
        if let Some(action) = &filter.action {
            qb.push(" AND l.acao = ").push_bind(action.clone());
        }
        if let Some(from) = filter.from {
            qb.push(" AND l.timestamp >= ").push_bind(from);
        }
        if let Some(until) = filter.until {
            qb.push(" AND l.timestamp <= ").push_bind(until);
        }
        qb.push(" ORDER BY l.timestamp DESC");

        let rows: Vec<LogRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(LogRecord::try_from).collect()
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
