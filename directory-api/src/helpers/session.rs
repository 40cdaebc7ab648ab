use actix_web::http::header::AUTHORIZATION;
use actix_web::HttpRequest;
use directory_store::{CompanyBackend, SessionUser};

use crate::error::ApiError;

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Resolve the admin session behind the request's bearer token.
pub async fn require_admin(
    req: &HttpRequest,
    backend: &dyn CompanyBackend,
) -> Result<SessionUser, ApiError> {
    let token = bearer_token(req)
        .ok_or_else(|| ApiError::Unauthorized("Sign in to manage companies".to_string()))?;

    match backend.session_user(token).await? {
        Some(user) => {
            tracing::debug!("Admin request from {}", user.id);
            Ok(user)
        }
        None => Err(ApiError::Unauthorized("Session is invalid or expired".to_string())),
    }
}
