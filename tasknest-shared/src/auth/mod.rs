/// Authentication primitives for TaskNest
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Access/refresh token issuance and verification
///
/// # Example
///
/// ```
/// use tasknest_shared::auth::jwt::{TokenKind, TokenService};
/// use tasknest_shared::auth::password::{PasswordConfig, PasswordHasher};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = PasswordHasher::new(PasswordConfig::default())?;
/// let hash = hasher.hash("user_password")?;
/// assert!(hasher.verify("user_password", &hash)?);
///
/// let tokens = TokenService::new("your-secret-key-at-least-32-bytes-long");
/// let pair = tokens.issue_pair(Uuid::new_v4())?;
/// tokens.verify(&pair.refresh, TokenKind::Refresh)?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod password;
