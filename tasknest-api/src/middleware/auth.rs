/// Access gate
///
/// Two middleware functions guard the authenticated routes:
///
/// - [`require_access`]: task endpoints; only access tokens pass
/// - [`require_refresh`]: the refresh endpoint; only refresh tokens pass
///
/// Both read `Authorization: Bearer <token>`, verify it with the
/// [`TokenService`], and on success insert a [`Principal`] and the raw
/// [`BearerToken`] into the request extensions. Any failure (missing
/// header, wrong scheme, bad signature, expired, wrong kind) stops the
/// request with the same 401 before a handler runs.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use std::sync::Arc;
/// use tasknest_api::middleware::auth::{require_access, Principal};
/// use tasknest_shared::auth::jwt::TokenService;
///
/// async fn whoami(principal: Principal) -> String {
///     principal.user_id.to_string()
/// }
///
/// let tokens = Arc::new(TokenService::new("your-secret-key-at-least-32-bytes-long"));
/// let app: Router = Router::new()
///     .route("/whoami", get(whoami))
///     .layer(middleware::from_fn_with_state(tokens, require_access));
/// ```

use crate::error::ApiError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tasknest_shared::auth::jwt::{TokenKind, TokenService};
use uuid::Uuid;

/// The authenticated user bound to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,

    /// Kind of the token that authenticated the request
    pub kind: TokenKind,
}

/// The verified bearer string, kept for handlers that re-use it
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Lets only access tokens through
pub async fn require_access(
    State(tokens): State<Arc<TokenService>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    authenticate(&tokens, TokenKind::Access, req, next).await
}

/// Lets only refresh tokens through
pub async fn require_refresh(
    State(tokens): State<Arc<TokenService>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    authenticate(&tokens, TokenKind::Refresh, req, next).await
}

async fn authenticate(
    tokens: &TokenService,
    expected: TokenKind,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers()).ok_or_else(|| {
        tracing::debug!("Missing or malformed Authorization header");
        ApiError::unauthorized()
    })?;

    let claims = tokens.verify(token, expected)?;

    let principal = Principal {
        user_id: claims.sub,
        kind: claims.token_kind,
    };
    let bearer = BearerToken(token.to_string());

    req.extensions_mut().insert(principal);
    req.extensions_mut().insert(bearer);

    Ok(next.run(req).await)
}

/// Token from `Authorization: Bearer <token>`; the scheme is case-insensitive
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .copied()
            .ok_or_else(ApiError::unauthorized)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<BearerToken>()
            .cloned()
            .ok_or_else(ApiError::unauthorized)
    }
}
