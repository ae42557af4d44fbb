use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::OwnerId;
use crate::presentation::state::AppState;

#[derive(Serialize)]
struct AuthErrorResponse {
    error: String,
}

/// Establish the caller identity from the bearer token, or produce the 401
/// response to return. Every owner-scoped handler goes through here.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<OwnerId, Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let Some(token) = token else {
        return Err(unauthorized());
    };

    match state.auth_verifier.verify(token).await {
        Ok(owner) => Ok(owner),
        Err(e) => {
            tracing::debug!(error = %e, "Bearer token rejected");
            Err(unauthorized())
        }
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(AuthErrorResponse {
            error: "Unauthorized".to_string(),
        }),
    )
        .into_response()
}
