use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::Response,
    Extension,
};

use crate::{jwt::JwtManager, types::AppError};

/// Authenticated user information extracted from the bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// The user id from the token's `sub` claim
    pub user_id: String,
}

/// Axum extractor for the authenticated user
///
/// Use this in handlers behind [`auth_middleware`]:
/// ```ignore
/// async fn protected_handler(
///     user: AuthenticatedUser,
///     // ... other extractors
/// ) -> Result<impl IntoResponse, AppError> {
///     // Access user.user_id
///     Ok("Protected content")
/// }
/// ```
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            AppError::new(
                StatusCode::UNAUTHORIZED,
                "missing_auth",
                "Authentication required but user not found in request extensions",
                false,
            )
        })
    }
}

/// JWT authentication middleware
///
/// Extracts the Bearer token from the Authorization header, validates it
/// and adds [`AuthenticatedUser`] to the request extensions. Returns 401
/// for invalid or missing tokens.
///
/// # Errors
///
/// - `AppError` - Invalid/missing token with 401 status code
pub async fn auth_middleware(
    Extension(jwt_manager): Extension<Arc<JwtManager>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or_else(|| {
            AppError::new(
                StatusCode::UNAUTHORIZED,
                "missing_token",
                "Authorization header must contain a valid Bearer token",
                false,
            )
        })?;

    let claims = jwt_manager.decode(token)?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: claims.subject,
    });

    Ok(next.run(request).await)
}
