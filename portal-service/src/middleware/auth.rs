use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use portal_core::error::AppError;

use crate::models::Account;
use crate::AppState;

/// Caller resolved by [`auth_middleware`], available to handlers as an
/// extractor.
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

/// Resolves the bearer token into a live, approved account and stores it in
/// the request extensions. Mounted on every route behind `/api` except the
/// public register/login pair.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let account = state.gate.authenticate(header).await?;
    req.extensions_mut().insert(CurrentAccount(account));

    Ok(next.run(req).await)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentAccount
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentAccount>().cloned().ok_or_else(|| {
            AppError::Unauthorized(anyhow::anyhow!("not authorized, token not provided"))
        })
    }
}
