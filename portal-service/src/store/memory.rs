//! In-memory store used by tests and local experiments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::models::{
    Account, AccountScope, ApprovalStatus, AuditEntry, Company, LogActor, LogFilter, LogRecord,
};

#[derive(Default)]
pub struct MemoryStore {
    accounts: Mutex<HashMap<Uuid, Account>>,
    companies: Mutex<HashMap<Uuid, Company>>,
    logs: Mutex<Vec<AuditEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn count_accounts(&self) -> Result<u64, StoreError> {
        Ok(self.accounts.lock().unwrap().len() as u64)
    }

    async fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        self.accounts
            .lock()
            .unwrap()
            .insert(account.id, account.clone());
        Ok(())
    }

    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.lock().unwrap().get(&id).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn list_accounts(&self, scope: &AccountScope) -> Result<Vec<Account>, StoreError> {
        let accounts = self.accounts.lock().unwrap();
        let mut matched: Vec<Account> = accounts
            .values()
            .filter(|a| match scope {
                AccountScope::All => true,
                AccountScope::Company(company_id) => a.company_id == *company_id,
                AccountScope::Own(id) => a.id == *id,
            })
            .cloned()
            .collect();
        matched.sort_by_key(|a| a.created_at);
        Ok(matched)
    }

    async fn set_account_status(&self, id: Uuid, status: ApprovalStatus) -> Result<(), StoreError> {
        if let Some(account) = self.accounts.lock().unwrap().get_mut(&id) {
            account.status = status;
        }
        Ok(())
    }

    async fn set_account_company(&self, id: Uuid, company: Option<Uuid>) -> Result<(), StoreError> {
        if let Some(account) = self.accounts.lock().unwrap().get_mut(&id) {
            account.company_id = company;
        }
        Ok(())
    }

    async fn count_accounts_in_company(&self, company: Uuid) -> Result<u64, StoreError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.company_id == Some(company))
            .count() as u64)
    }

    async fn insert_company(&self, company: &Company) -> Result<(), StoreError> {
        self.companies
            .lock()
            .unwrap()
            .insert(company.id, company.clone());
        Ok(())
    }

    async fn find_company_by_id(&self, id: Uuid) -> Result<Option<Company>, StoreError> {
        Ok(self.companies.lock().unwrap().get(&id).cloned())
    }

    async fn list_companies(&self) -> Result<Vec<Company>, StoreError> {
        let mut companies: Vec<Company> =
            self.companies.lock().unwrap().values().cloned().collect();
        companies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(companies)
    }

    async fn update_company(&self, company: &Company) -> Result<(), StoreError> {
        self.companies
            .lock()
            .unwrap()
            .insert(company.id, company.clone());
        Ok(())
    }

    async fn delete_company(&self, id: Uuid) -> Result<(), StoreError> {
        self.companies.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn insert_log(&self, entry: &AuditEntry) -> Result<(), StoreError> {
        self.logs.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn list_logs(&self, filter: &LogFilter) -> Result<Vec<LogRecord>, StoreError> {
        let accounts = self.accounts.lock().unwrap();
        let mut records: Vec<LogRecord> = self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| {
                filter
                    .account_ids
                    .as_ref()
                    .map_or(true, |ids| ids.contains(&entry.account_id))
                    && filter
                        .action
                        .as_ref()
                        .map_or(true, |action| &entry.action == action)
                    && filter.from.map_or(true, |from| entry.timestamp >= from)
                    && filter.until.map_or(true, |until| entry.timestamp <= until)
            })
            .map(|entry| LogRecord {
                id: entry.id,
                account_id: entry.account_id,
                action: entry.action.clone(),
                timestamp: entry.timestamp,
                actor: accounts.get(&entry.account_id).map(|a| LogActor {
                    id: a.id,
                    name: a.name.clone(),
                    email: a.email.clone(),
                    role: a.role,
                }),
            })
            .collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn account(name: &str, email: &str, company: Option<Uuid>) -> Account {
        let mut a = Account::new(
            name.to_string(),
            email.to_string(),
            Role::Operator,
            ApprovalStatus::Pending,
        );
        a.company_id = company;
        a
    }

    #[tokio::test]
    async fn email_lookup_is_case_sensitive() {
        let store = MemoryStore::new();
        store
            .insert_account(&account("Ana", "Ana@x.com", None))
            .await
            .unwrap();

        assert!(store
            .find_account_by_email("Ana@x.com")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_account_by_email("ana@x.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn company_scope_matches_unassigned_accounts_when_none() {
        let store = MemoryStore::new();
        let company = Uuid::new_v4();
        store
            .insert_account(&account("A", "a@x.com", Some(company)))
            .await
            .unwrap();
        store
            .insert_account(&account("B", "b@x.com", None))
            .await
            .unwrap();

        let assigned = store
            .list_accounts(&AccountScope::Company(Some(company)))
            .await
            .unwrap();
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].email, "a@x.com");

        let unassigned = store
            .list_accounts(&AccountScope::Company(None))
            .await
            .unwrap();
        assert_eq!(unassigned.len(), 1);
        assert_eq!(unassigned[0].email, "b@x.com");
    }

    #[tokio::test]
    async fn empty_id_filter_matches_no_logs() {
        let store = MemoryStore::new();
        let a = account("A", "a@x.com", None);
        store.insert_account(&a).await.unwrap();
        store
            .insert_log(&AuditEntry::new(a.id, "Login no sistema".to_string()))
            .await
            .unwrap();

        let filter = LogFilter {
            account_ids: Some(vec![]),
            ..LogFilter::default()
        };
        assert!(store.list_logs(&filter).await.unwrap().is_empty());

        let all = store.list_logs(&LogFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].actor.as_ref().unwrap().email, "a@x.com");
    }
}
