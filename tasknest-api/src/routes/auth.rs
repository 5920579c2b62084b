/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/v1/register` - Register a new user
/// - `POST /api/v1/login` - Log in
/// - `GET /api/v1/refresh` - Exchange a refresh token for a new pair
///
/// All three answer with the same body:
///
/// ```json
/// { "token": { "access": "<jwt>", "refresh": "<jwt>" } }
/// ```

use crate::{
    app::AppState,
    error::ApiResult,
    extract::ValidatedJson,
    middleware::auth::{BearerToken, Principal},
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tasknest_shared::auth::jwt::TokenPair;
use validator::Validate;

/// Register and login request
#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    /// Login name (case-sensitive)
    #[validate(length(min = 1, max = 64, message = "Login must be 1 to 64 characters"))]
    pub login: String,

    /// Plaintext password
    #[validate(length(min = 1, max = 128, message = "Password must be 1 to 128 characters"))]
    pub password: String,
}

/// Token pair response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: TokenPair,
}

/// Register endpoint
///
/// # Errors
///
/// - 400 if login or password break the length rules
/// - 409 if the login is already registered
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CredentialsRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let token = state.accounts.register(&req.login, &req.password).await?;
    Ok(Json(TokenResponse { token }))
}

/// Login endpoint
///
/// # Errors
///
/// - 401 for an unknown login or a wrong password, with one message for both
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CredentialsRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let token = state.accounts.login(&req.login, &req.password).await?;
    Ok(Json(TokenResponse { token }))
}

/// Refresh endpoint
///
/// Sits behind `require_refresh`, so the bearer has already been verified
/// as a refresh token. The presented token stays valid until it expires.
pub async fn refresh(
    State(state): State<AppState>,
    principal: Principal,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<TokenResponse>> {
    let token = state.tokens.refresh(&token)?;
    tracing::debug!(user_id = %principal.user_id, "Token pair refreshed");
    Ok(Json(TokenResponse { token }))
}
