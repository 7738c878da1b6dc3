//! Bearer token authentication middleware

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Resolve the bearer token to an [`Actor`](erm_application::Actor)
///
/// The actor is inserted into the request extensions for handlers to extract
/// with `Extension<Actor>`. Missing, malformed, expired or orphaned tokens are
/// rejected with 401.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Authentication("Missing bearer token".to_string()))?;

    let actor = state.auth.authenticate(token).await.map_err(|err| {
        tracing::debug!(error = %err, "Rejected bearer token");
        ApiError::from(err)
    })?;

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}
