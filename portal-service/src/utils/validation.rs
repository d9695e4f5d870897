use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use validator::Validate;

/// JSON extractor that runs `validator` rules before the handler sees the
/// payload. Both parse and validation failures produce the portal's
/// `{"status":"error", ...}` envelope with a 400.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "status": "error",
                    "message": format!("malformed request body: {}", e.body_text()),
                })),
            )
                .into_response()
        })?;

        value.validate().map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "status": "error",
                    "message": "invalid input data",
                    "errors": e
                        .field_errors()
                        .into_iter()
                        .map(|(field, errors)| {
                            json!({
                                "field": field,
                                "message": errors
                                    .first()
                                    .and_then(|err| err.message.as_ref())
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| "invalid value".to_string()),
                            })
                        })
                        .collect::<Vec<_>>(),
                })),
            )
                .into_response()
        })?;

        Ok(ValidatedJson(value))
    }
}
