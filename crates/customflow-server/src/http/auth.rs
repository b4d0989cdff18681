use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use customflow_core::CustomFlowError;
use customflow_core::auth::Credentials;

use crate::app::AppState;
use crate::http::error::ApiError;

/// Resolves the caller and stores the `Principal` as a request extension.
pub async fn require_principal(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let credentials = Credentials {
        authorization: request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
    };

    match state.authenticator.authenticate(&credentials).await {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(err @ CustomFlowError::Unauthorized(_)) => ApiError(err).into_response(),
        Err(other) => {
            tracing::warn!(error = %other, "Authenticator failed");
            ApiError(CustomFlowError::Unauthorized(
                "could not authenticate request".to_string(),
            ))
            .into_response()
        }
    }
}
