use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{AccountSummary, Role};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[serde(rename = "nome")]
    #[validate(length(min = 1, message = "nome é obrigatório"))]
    pub name: String,
    #[validate(email(message = "email inválido"))]
    pub email: String,
    #[serde(rename = "senha")]
    #[validate(length(min = 6, message = "senha deve ter no mínimo 6 caracteres"))]
    pub password: String,
    /// Requested role. `admin` is never grantable through registration.
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "email inválido"))]
    pub email: String,
    #[serde(rename = "senha")]
    #[validate(length(min = 1, message = "senha é obrigatória"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub status: String,
    pub message: String,
    pub data: AccountEnvelope,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub status: String,
    pub token: String,
    pub data: AccountEnvelope,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccountEnvelope {
    pub usuario: AccountSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_uses_wire_field_names() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"nome":"Ana","email":"ana@x.com","senha":"123456","role":"gerente"}"#,
        )
        .unwrap();
        assert_eq!(req.name, "Ana");
        assert_eq!(req.password, "123456");
        assert_eq!(req.role, Some(Role::Manager));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn role_is_optional() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"nome":"Ana","email":"ana@x.com","senha":"123456"}"#).unwrap();
        assert_eq!(req.role, None);
    }

    #[test]
    fn short_password_fails_validation() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"nome":"Ana","email":"ana@x.com","senha":"12345"}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
