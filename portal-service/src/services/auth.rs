use std::sync::Arc;

use crate::dtos::auth::{LoginRequest, RegisterRequest};
use crate::models::{Account, ApprovalStatus, Role};
use crate::services::{AuditRecorder, ServiceError, TokenService};
use crate::store::Store;
use crate::utils::Password;

/// Credential verification, registration, and login orchestration.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    tokens: TokenService,
    audit: AuditRecorder,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService, audit: AuditRecorder) -> Self {
        Self {
            store,
            tokens,
            audit,
        }
    }

    /// Check an email/password pair against the stored hash.
    ///
    /// Unknown email and wrong password fail identically so the login surface
    /// never confirms whether an address is registered. Pure check: approval
    /// gating and audit logging belong to the callers.
    pub async fn verify_credentials(
        &self,
        email: &str,
        candidate: &Password,
    ) -> Result<Account, ServiceError> {
        let account = self
            .store
            .find_account_by_email(email)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !account.verify_password(candidate)? {
            return Err(ServiceError::InvalidCredentials);
        }

        Ok(account)
    }

    /// Create an account. The very first account ever registered becomes an
    /// approved admin; everyone after that starts pending, and a request for
    /// the admin role is rejected outright rather than silently downgraded.
    ///
    /// Returns the new account and whether it was the first one.
    pub async fn register(&self, req: RegisterRequest) -> Result<(Account, bool), ServiceError> {
        if self
            .store
            .find_account_by_email(&req.email)
            .await?
            .is_some()
        {
            return Err(ServiceError::EmailTaken);
        }

        let first = self.store.count_accounts().await? == 0;

        let (role, status) = if first {
            (Role::Admin, ApprovalStatus::Approved)
        } else {
            let role = match req.role {
                None => Role::Operator,
                Some(Role::Admin) => {
                    return Err(ServiceError::Validation(
                        "the admin role cannot be requested at registration".to_string(),
                    ))
                }
                Some(role) => role,
            };
            (role, ApprovalStatus::Pending)
        };

        let mut account = Account::new(req.name, req.email, role, status);
        account.set_password(&Password::new(req.password))?;
        self.store.insert_account(&account).await?;

        tracing::info!(account_id = %account.id, role = role.as_str(), "account registered");

        self.audit.record(
            account.id,
            if first {
                "Registro como primeiro administrador"
            } else {
                "Solicitação de registro"
            },
        );

        Ok((account, first))
    }

    /// Authenticate and mint a bearer token. Approval gating happens here as
    /// well as on every later request, so a mid-session rejection takes
    /// effect on the account's next call.
    pub async fn login(&self, req: LoginRequest) -> Result<(String, Account), ServiceError> {
        let account = self
            .verify_credentials(&req.email, &Password::new(req.password))
            .await?;

        if !account.is_approved() {
            return Err(ServiceError::NotApproved);
        }

        let token = self.tokens.issue(account.id)?;

        tracing::info!(account_id = %account.id, "login successful");
        self.audit.record(account.id, "Login no sistema");

        Ok((token, account))
    }
}
