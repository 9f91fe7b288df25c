use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::token::AuthUser;
use crate::gateway::{
    state::AppState,
    types::{ApiResponse, error_codes},
};

fn reject(code: i32, msg: &str) -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::error(code, msg)),
    )
}

/// Resolve `Authorization: Bearer <jwt>` into an [`AuthUser`] extension.
pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, Json<ApiResponse<()>>)> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| reject(error_codes::MISSING_AUTH, "Missing Authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| reject(error_codes::AUTH_FAILED, "Invalid token format"))?;

    let user_id = state
        .tokens
        .verify(token)
        .ok()
        .and_then(|claims| claims.user_id())
        .ok_or_else(|| reject(error_codes::AUTH_FAILED, "Invalid or expired token"))?;

    request.extensions_mut().insert(AuthUser { user_id });
    Ok(next.run(request).await)
}
