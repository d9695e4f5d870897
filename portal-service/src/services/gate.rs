use std::sync::Arc;
use uuid::Uuid;

use crate::models::{Account, AccountScope, Role};
use crate::services::{ServiceError, TokenService};
use crate::store::Store;

/// Per-request authorization decisions.
///
/// The gate owns the full chain from bearer header to allow/deny: token
/// verification, live account resolution, approval gating, role allow-lists,
/// and the same-company rule. Nothing is cached between requests, so a
/// rejection or demotion takes effect on the account's very next call.
#[derive(Clone)]
pub struct AccessGate {
    store: Arc<dyn Store>,
    tokens: TokenService,
}

impl AccessGate {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    /// Resolve the caller behind an `Authorization` header.
    ///
    /// A missing or non-`Bearer` header is rejected before any cryptographic
    /// work. After the token checks out, the live account record is
    /// re-fetched and must still be approved.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<Account, ServiceError> {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .filter(|t| !t.is_empty())
            .ok_or(ServiceError::TokenMissing)?;

        let claims = self.tokens.verify(token)?;

        let account = self
            .store
            .find_account_by_id(claims.sub)
            .await?
            .ok_or(ServiceError::AccountGone)?;

        if !account.is_approved() {
            return Err(ServiceError::NotApproved);
        }

        Ok(account)
    }

    /// Role allow-list check for an operation.
    pub fn require_role(&self, caller: &Account, allowed: &[Role]) -> Result<(), ServiceError> {
        if allowed.contains(&caller.role) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden)
        }
    }

    /// Same-company rule for operations addressing one target account.
    ///
    /// Admin always passes; everyone may address their own record; a manager
    /// may address accounts sharing their company reference; an operator may
    /// never address another account. The operator refusal happens on the id
    /// alone, before any lookup, so a 404-vs-403 difference cannot tell an
    /// operator which ids exist. Returns the target so callers do not fetch
    /// it twice.
    pub async fn authorize_target(
        &self,
        caller: &Account,
        target_id: Uuid,
    ) -> Result<Account, ServiceError> {
        if caller.role == Role::Operator && target_id != caller.id {
            return Err(ServiceError::Forbidden);
        }

        let target = self
            .store
            .find_account_by_id(target_id)
            .await?
            .ok_or(ServiceError::AccountNotFound)?;

        if target.id == caller.id {
            return Ok(target);
        }

        match caller.role {
            Role::Admin => Ok(target),
            Role::Manager => {
                if target.company_id == caller.company_id {
                    Ok(target)
                } else {
                    Err(ServiceError::Forbidden)
                }
            }
            Role::Operator => Err(ServiceError::Forbidden),
        }
    }

    /// Implicit filter for collection reads; a data-scoping rule rather than
    /// an allow/deny gate.
    pub fn listing_scope(&self, caller: &Account) -> AccountScope {
        match caller.role {
            Role::Admin => AccountScope::All,
            Role::Manager => AccountScope::Company(caller.company_id),
            Role::Operator => AccountScope::Own(caller.id),
        }
    }
}
