//! Account model: the identity subject to authentication and approval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::utils::{Password, PasswordHashString};

/// Closed set of roles. The wire (and stored) representation keeps the
/// portal's original vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "gerente")]
    Manager,
    #[serde(rename = "operador")]
    Operator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "gerente",
            Role::Operator => "operador",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "gerente" => Ok(Role::Manager),
            "operador" => Ok(Role::Operator),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Tri-state approval workflow flag gating authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ApprovalStatus {
    #[serde(rename = "pendente")]
    Pending,
    #[serde(rename = "aprovado")]
    Approved,
    #[serde(rename = "rejeitado")]
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pendente",
            ApprovalStatus::Approved => "aprovado",
            ApprovalStatus::Rejected => "rejeitado",
        }
    }
}

impl std::str::FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendente" => Ok(ApprovalStatus::Pending),
            "aprovado" => Ok(ApprovalStatus::Approved),
            "rejeitado" => Ok(ApprovalStatus::Rejected),
            other => Err(format!("unknown approval status: {}", other)),
        }
    }
}

/// Account entity. The password hash never leaves this struct: API responses
/// go through [`Account::sanitized`].
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: PasswordHashString,
    pub role: Role,
    pub status: ApprovalStatus,
    pub company_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(name: String, email: String, role: Role, status: ApprovalStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash: PasswordHashString::empty(),
            role,
            status,
            company_id: None,
            created_at: Utc::now(),
        }
    }

    /// Hash and assign the secret. Hashing happens here, before the value can
    /// ever reach the store; there is no implicit hash-on-save anywhere else.
    pub fn set_password(&mut self, plain: &Password) -> Result<(), anyhow::Error> {
        self.password_hash = plain.hash()?;
        Ok(())
    }

    /// Constant-time check of a candidate secret against the stored hash.
    pub fn verify_password(&self, candidate: &Password) -> Result<bool, anyhow::Error> {
        self.password_hash.verify(candidate)
    }

    pub fn is_approved(&self) -> bool {
        self.status == ApprovalStatus::Approved
    }

    /// Response shape with the secret excluded.
    pub fn sanitized(&self) -> AccountSummary {
        AccountSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            status: self.status,
            company_id: self.company_id,
            created_at: self.created_at,
        }
    }
}

/// Account as returned by the API (no hash), using the portal's wire names.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccountSummary {
    pub id: Uuid,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: ApprovalStatus,
    #[serde(rename = "empresa_id")]
    pub company_id: Option<Uuid>,
    #[serde(rename = "criado_em")]
    pub created_at: DateTime<Utc>,
}

/// Implicit filter applied to collection reads. This is a data-scoping rule,
/// not an allow/deny gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountScope {
    /// Admin: everything.
    All,
    /// Manager: accounts sharing the caller's company reference (which may be
    /// unset, in which case only other unassigned accounts match).
    Company(Option<Uuid>),
    /// Operator: the caller's own record only.
    Own(Uuid),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_wire_names() {
        for (role, s) in [
            (Role::Admin, "admin"),
            (Role::Manager, "gerente"),
            (Role::Operator, "operador"),
        ] {
            assert_eq!(role.as_str(), s);
            assert_eq!(s.parse::<Role>().unwrap(), role);
            assert_eq!(serde_json::to_string(&role).unwrap(), format!("\"{}\"", s));
        }
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn status_round_trips_through_wire_names() {
        for (status, s) in [
            (ApprovalStatus::Pending, "pendente"),
            (ApprovalStatus::Approved, "aprovado"),
            (ApprovalStatus::Rejected, "rejeitado"),
        ] {
            assert_eq!(status.as_str(), s);
            assert_eq!(s.parse::<ApprovalStatus>().unwrap(), status);
        }
    }

    #[test]
    fn sanitized_summary_never_contains_the_hash() {
        let mut account = Account::new(
            "Ana".to_string(),
            "ana@x.com".to_string(),
            Role::Admin,
            ApprovalStatus::Approved,
        );
        account
            .set_password(&Password::new("123456".to_string()))
            .unwrap();

        let json = serde_json::to_string(&account.sanitized()).unwrap();
        assert!(!json.contains("senha"));
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"nome\":\"Ana\""));
    }

    #[test]
    fn set_password_then_verify() {
        let mut account = Account::new(
            "Ana".to_string(),
            "ana@x.com".to_string(),
            Role::Operator,
            ApprovalStatus::Pending,
        );
        account
            .set_password(&Password::new("s3cret-pass".to_string()))
            .unwrap();

        assert!(account
            .verify_password(&Password::new("s3cret-pass".to_string()))
            .unwrap());
        assert!(!account
            .verify_password(&Password::new("wrong".to_string()))
            .unwrap());
    }
}
