use portal_core::error::AppError;
use thiserror::Error;

use crate::store::StoreError;

/// Expected, caller-recoverable failure kinds of the portal.
///
/// `InvalidCredentials` deliberately covers both "no such email" and "wrong
/// password" so the login surface never confirms whether an email is
/// registered. The three token kinds stay distinguishable so a legitimate
/// client can tell "log in again" from "something is wrong", but none of them
/// leaks account existence.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email already in use")]
    EmailTaken,

    #[error("account not approved")]
    NotApproved,

    #[error("token not provided")]
    TokenMissing,

    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    TokenExpired,

    #[error("account no longer exists")]
    AccountGone,

    #[error("insufficient permission")]
    Forbidden,

    #[error("user not found")]
    AccountNotFound,

    #[error("company not found")]
    CompanyNotFound,

    #[error("company has associated accounts")]
    CompanyInUse,

    #[error("validation error: {0}")]
    Validation(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Store(e) => AppError::DatabaseError(anyhow::anyhow!(e)),
            ServiceError::Internal(e) => AppError::InternalError(e),
            ServiceError::InvalidCredentials => {
                AppError::AuthError(anyhow::anyhow!("incorrect email or password"))
            }
            ServiceError::EmailTaken => AppError::BadRequest(anyhow::anyhow!("email already in use")),
            ServiceError::NotApproved => {
                AppError::Forbidden(anyhow::anyhow!("account not approved"))
            }
            ServiceError::TokenMissing => {
                AppError::AuthError(anyhow::anyhow!("not authorized, token not provided"))
            }
            ServiceError::InvalidToken => AppError::AuthError(anyhow::anyhow!("invalid token")),
            ServiceError::TokenExpired => AppError::AuthError(anyhow::anyhow!("token expired")),
            ServiceError::AccountGone => {
                AppError::AuthError(anyhow::anyhow!("account no longer exists"))
            }
            ServiceError::Forbidden => {
                AppError::Forbidden(anyhow::anyhow!("insufficient permission"))
            }
            ServiceError::AccountNotFound => AppError::NotFound(anyhow::anyhow!("user not found")),
            ServiceError::CompanyNotFound => {
                AppError::NotFound(anyhow::anyhow!("company not found"))
            }
            ServiceError::CompanyInUse => {
                AppError::BadRequest(anyhow::anyhow!("company has associated accounts"))
            }
            ServiceError::Validation(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
        }
    }
}
