//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, verifies the role-tagged
//! JWT, and injects the resulting [`Actor`] into request extensions for
//! downstream handlers. Handlers never read role context from anywhere
//! else.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth::{self, Actor};

/// Require a valid bearer token from any of the three roles.
///
/// Accesses `ApiContext` from request extensions (injected by Extension
/// layer). On success: injects `Actor`.
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let actor: Actor = auth::verify_token(&ctx.jwt_secret, token)?;
    req.extensions_mut().insert(actor);

    Ok(next.run(req).await)
}
