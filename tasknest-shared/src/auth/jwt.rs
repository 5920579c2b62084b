/// Token service: issues and verifies access/refresh token pairs
///
/// Tokens are HS256 JWTs signed with a single shared secret. Every token
/// carries a `token_kind` claim, and verification always takes the kind the
/// caller expects: an access token presented where a refresh token is
/// required fails with [`TokenError::WrongKind`] even though its signature is
/// valid, and vice versa.
///
/// Tokens are stateless. Refreshing mints a new pair but leaves the old
/// refresh token valid until its own expiry; there is no revocation list.
///
/// # Lifetimes
///
/// - **Access Token**: 1 hour
/// - **Refresh Token**: 72 hours
///
/// # Example
///
/// ```
/// use tasknest_shared::auth::jwt::{TokenKind, TokenService};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenService::new("your-secret-key-at-least-32-bytes-long");
/// let user_id = Uuid::new_v4();
///
/// let pair = tokens.issue_pair(user_id)?;
/// let claims = tokens.verify(&pair.access, TokenKind::Access)?;
/// assert_eq!(claims.sub, user_id);
///
/// // The access token is not a refresh token.
/// assert!(tokens.verify(&pair.access, TokenKind::Refresh).is_err());
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Issuer claim stamped on and required from every token
pub const ISSUER: &str = "tasknest";

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Signature does not match the configured secret
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token is past its `exp` claim
    #[error("Token has expired")]
    Expired,

    /// Token verified but was issued for the other purpose
    #[error("Expected {expected} token, got {actual} token")]
    WrongKind { expected: TokenKind, actual: TokenKind },

    /// Token could not be decoded or failed a structural check
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// Signing failed
    #[error("Failed to create token: {0}")]
    Encode(String),
}

/// What a token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Authorizes ordinary API calls
    Access,

    /// Authorizes minting a new token pair, nothing else
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "tasknest")
/// - `iat`: Issued at timestamp
/// - `nbf`: Not before timestamp
/// - `exp`: Expiration timestamp
/// - `jti`: Random token ID, keeps pairs issued in the same second distinct
///
/// # Custom Claims
///
/// - `token_kind`: Access or refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iss: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub jti: Uuid,
    pub token_kind: TokenKind,
}

impl Claims {
    /// Creates claims expiring `expires_in` from now
    ///
    /// A negative duration yields an already-expired token.
    pub fn new(user_id: Uuid, token_kind: TokenKind, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            jti: Uuid::new_v4(),
            token_kind,
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Access/refresh credential pair handed to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Issues, signs and verifies token pairs with a shared HS256 secret
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// Default access token lifetime
    pub const DEFAULT_ACCESS_TTL_SECS: i64 = 60 * 60;

    /// Default refresh token lifetime
    pub const DEFAULT_REFRESH_TTL_SECS: i64 = 72 * 60 * 60;

    /// Creates a service with the default lifetimes (1h access, 72h refresh)
    pub fn new(secret: &str) -> Self {
        Self::with_lifetimes(
            secret,
            Duration::seconds(Self::DEFAULT_ACCESS_TTL_SECS),
            Duration::seconds(Self::DEFAULT_REFRESH_TTL_SECS),
        )
    }

    /// Creates a service with custom lifetimes
    pub fn with_lifetimes(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Lifetime of tokens of the given kind
    pub fn lifetime(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Signs arbitrary claims
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Issues a single token of the given kind for a user
    pub fn issue(&self, user_id: Uuid, kind: TokenKind) -> Result<String, TokenError> {
        self.sign(&Claims::new(user_id, kind, self.lifetime(kind)))
    }

    /// Issues a fresh access/refresh pair for a user
    pub fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access: self.issue(user_id, TokenKind::Access)?,
            refresh: self.issue(user_id, TokenKind::Refresh)?,
        })
    }

    /// Verifies a token and checks it is of the expected kind
    ///
    /// Checks, in order: signature and algorithm, expiry, not-before,
    /// issuer, and finally `token_kind`. Expiry is exact, with no clock leeway.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed(e.to_string()),
            })?
            .claims;

        if claims.token_kind != expected {
            return Err(TokenError::WrongKind {
                expected,
                actual: claims.token_kind,
            });
        }

        Ok(claims)
    }

    /// Exchanges a valid refresh token for a new pair
    ///
    /// The presented refresh token stays valid until it expires.
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, TokenError> {
        let claims = self.verify(refresh_token, TokenKind::Refresh)?;
        self.issue_pair(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_default_lifetimes() {
        let tokens = TokenService::new(SECRET);
        assert_eq!(tokens.lifetime(TokenKind::Access), Duration::hours(1));
        assert_eq!(tokens.lifetime(TokenKind::Refresh), Duration::hours(72));
    }

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, TokenKind::Access, Duration::hours(1));

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.token_kind, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_token_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TokenKind::Access).unwrap(), "\"access\"");
        assert_eq!(serde_json::to_string(&TokenKind::Refresh).unwrap(), "\"refresh\"");
    }

    #[test]
    fn test_issue_pair_and_verify() {
        let tokens = TokenService::new(SECRET);
        let user_id = Uuid::new_v4();

        let pair = tokens.issue_pair(user_id).expect("Should issue pair");
        assert_ne!(pair.access, pair.refresh);

        let access = tokens.verify(&pair.access, TokenKind::Access).unwrap();
        assert_eq!(access.sub, user_id);
        assert_eq!(access.token_kind, TokenKind::Access);
        assert_eq!(access.exp - access.iat, 3600);

        let refresh = tokens.verify(&pair.refresh, TokenKind::Refresh).unwrap();
        assert_eq!(refresh.sub, user_id);
        assert_eq!(refresh.token_kind, TokenKind::Refresh);
        assert_eq!(refresh.exp - refresh.iat, 72 * 3600);
    }

    #[test]
    fn test_pairs_are_distinct_within_same_second() {
        let tokens = TokenService::new(SECRET);
        let user_id = Uuid::new_v4();

        let first = tokens.issue_pair(user_id).unwrap();
        let second = tokens.issue_pair(user_id).unwrap();

        assert_ne!(first.access, second.access);
        assert_ne!(first.refresh, second.refresh);
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let tokens = TokenService::new(SECRET);
        let pair = tokens.issue_pair(Uuid::new_v4()).unwrap();

        let result = tokens.verify(&pair.access, TokenKind::Refresh);
        assert!(matches!(
            result,
            Err(TokenError::WrongKind {
                expected: TokenKind::Refresh,
                actual: TokenKind::Access
            })
        ));
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let tokens = TokenService::new(SECRET);
        let pair = tokens.issue_pair(Uuid::new_v4()).unwrap();

        let result = tokens.verify(&pair.refresh, TokenKind::Access);
        assert!(matches!(
            result,
            Err(TokenError::WrongKind {
                expected: TokenKind::Access,
                actual: TokenKind::Refresh
            })
        ));
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let issuer = TokenService::new(SECRET);
        let verifier = TokenService::new("a-completely-different-secret-of-32b");

        let token = issuer.issue(Uuid::new_v4(), TokenKind::Access).unwrap();
        let result = verifier.verify(&token, TokenKind::Access);
        assert!(matches!(result, Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = TokenService::new(SECRET);

        let claims = Claims::new(Uuid::new_v4(), TokenKind::Access, Duration::seconds(-3600));
        assert!(claims.is_expired());

        let token = tokens.sign(&claims).unwrap();
        let result = tokens.verify(&token, TokenKind::Access);
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_token_expired_one_second_ago_rejected() {
        let tokens = TokenService::new(SECRET);
        let claims = Claims::new(Uuid::new_v4(), TokenKind::Access, Duration::seconds(-1));
        let token = tokens.sign(&claims).unwrap();

        assert!(matches!(
            tokens.verify(&token, TokenKind::Access),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_expired_refresh_token_cannot_refresh() {
        let tokens = TokenService::new(SECRET);
        let claims = Claims::new(Uuid::new_v4(), TokenKind::Refresh, Duration::seconds(-3600));
        let token = tokens.sign(&claims).unwrap();

        assert!(matches!(tokens.refresh(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let tokens = TokenService::new(SECRET);
        let mut claims = Claims::new(Uuid::new_v4(), TokenKind::Access, Duration::hours(1));
        claims.iss = "someone-else".to_string();

        let token = tokens.sign(&claims).unwrap();
        assert!(matches!(
            tokens.verify(&token, TokenKind::Access),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let tokens = TokenService::new(SECRET);
        assert!(matches!(
            tokens.verify("not-a-jwt", TokenKind::Access),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_refresh_issues_new_pair() {
        let tokens = TokenService::new(SECRET);
        let user_id = Uuid::new_v4();
        let original = tokens.issue_pair(user_id).unwrap();

        let renewed = tokens.refresh(&original.refresh).unwrap();
        assert_ne!(renewed.access, original.access);
        assert_ne!(renewed.refresh, original.refresh);

        let access = tokens.verify(&renewed.access, TokenKind::Access).unwrap();
        let refresh = tokens.verify(&renewed.refresh, TokenKind::Refresh).unwrap();
        assert_eq!(access.sub, user_id);
        assert_eq!(refresh.sub, user_id);

        // No revocation: the old refresh token still works.
        assert!(tokens.refresh(&original.refresh).is_ok());
    }

    #[test]
    fn test_refresh_with_access_token_fails() {
        let tokens = TokenService::new(SECRET);
        let pair = tokens.issue_pair(Uuid::new_v4()).unwrap();

        assert!(matches!(
            tokens.refresh(&pair.access),
            Err(TokenError::WrongKind { .. })
        ));
    }
}
