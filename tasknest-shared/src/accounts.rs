/// Account directory: registration and login
///
/// Both operations end by issuing a fresh token pair for the user. Login
/// failures are uniform: an unknown login and a wrong password
/// both yield [`AccountError::Unauthorized`], and both run one Argon2
/// verification so they take comparable time.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tasknest_shared::accounts::AccountDirectory;
/// use tasknest_shared::auth::jwt::TokenService;
/// use tasknest_shared::auth::password::{PasswordConfig, PasswordHasher};
/// use tasknest_shared::store::MemoryStore;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = PasswordHasher::new(PasswordConfig {
///     memory_kib: 1024,
///     iterations: 1,
///     parallelism: 1,
/// })?;
/// let tokens = Arc::new(TokenService::new("your-secret-key-at-least-32-bytes-long"));
/// let accounts = AccountDirectory::new(Arc::new(MemoryStore::new()), hasher, tokens)?;
///
/// accounts.register("alice", "pw1").await?;
/// let pair = accounts.login("alice", "pw1").await?;
/// assert!(!pair.access.is_empty());
/// # Ok(())
/// # }
/// ```

use crate::auth::jwt::{TokenError, TokenPair, TokenService};
use crate::auth::password::{PasswordError, PasswordHasher};
use crate::models::user::CreateUser;
use crate::store::{Store, StoreError};
use std::sync::Arc;
use tracing::{debug, info};

/// Plaintext verified against when the login is unknown
const DUMMY_PASSWORD: &str = "tasknest-dummy-password";

/// Error type for account operations
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Login is already registered
    #[error("Login already exists")]
    AlreadyExists,

    /// Unknown login or wrong password
    #[error("Invalid login or password")]
    Unauthorized,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => AccountError::AlreadyExists,
            other => AccountError::Store(other),
        }
    }
}

/// Creates and authenticates users
pub struct AccountDirectory {
    store: Arc<dyn Store>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    dummy_hash: String,
}

impl AccountDirectory {
    /// Builds the directory; hashes the dummy password once up front
    pub fn new(
        store: Arc<dyn Store>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
    ) -> Result<Self, PasswordError> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;

        Ok(Self {
            store,
            hasher,
            tokens,
            dummy_hash,
        })
    }

    /// Registers a new user and returns their first token pair
    ///
    /// # Errors
    ///
    /// [`AccountError::AlreadyExists`] if the login is taken, whether that is
    /// seen by the lookup or by the store's unique constraint on a racing
    /// insert.
    pub async fn register(&self, login: &str, password: &str) -> Result<TokenPair, AccountError> {
        if self.store.find_user_by_login(login).await?.is_some() {
            debug!(login, "Registration rejected: login already exists");
            return Err(AccountError::AlreadyExists);
        }

        let password_hash = self.hasher.hash(password)?;

        let user = self
            .store
            .insert_user(CreateUser {
                login: login.to_string(),
                password_hash,
            })
            .await
            .map_err(|e| {
                if matches!(e, StoreError::Conflict(_)) {
                    debug!(login, "Registration lost a race on the login constraint");
                }
                AccountError::from(e)
            })?;

        info!(user_id = %user.id, "User registered");

        Ok(self.tokens.issue_pair(user.id)?)
    }

    /// Authenticates a user and returns a fresh token pair
    pub async fn login(&self, login: &str, password: &str) -> Result<TokenPair, AccountError> {
        let Some(user) = self.store.find_user_by_login(login).await? else {
            // Same cost as a real verification.
            let _ = self.hasher.verify(password, &self.dummy_hash);
            debug!(login, "Login rejected: unknown login");
            return Err(AccountError::Unauthorized);
        };

        if !self.hasher.verify(password, &user.password_hash)? {
            debug!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AccountError::Unauthorized);
        }

        info!(user_id = %user.id, "User logged in");

        Ok(self.tokens.issue_pair(user.id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::TokenKind;
    use crate::auth::password::PasswordConfig;
    use crate::store::MemoryStore;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn directory() -> (AccountDirectory, Arc<TokenService>, Arc<MemoryStore>) {
        let hasher = PasswordHasher::new(PasswordConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        let tokens = Arc::new(TokenService::new(SECRET));
        let store = Arc::new(MemoryStore::new());
        let accounts = AccountDirectory::new(store.clone(), hasher, tokens.clone()).unwrap();
        (accounts, tokens, store)
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (accounts, tokens, _) = directory();

        let registered = accounts.register("alice", "pw1").await.unwrap();
        let logged_in = accounts.login("alice", "pw1").await.unwrap();

        let a = tokens.verify(&registered.access, TokenKind::Access).unwrap();
        let b = tokens.verify(&logged_in.access, TokenKind::Access).unwrap();
        assert_eq!(a.sub, b.sub);
        assert_ne!(registered, logged_in);
    }

    #[tokio::test]
    async fn test_each_login_returns_distinct_pair() {
        let (accounts, _, _) = directory();
        accounts.register("alice", "pw1").await.unwrap();

        let first = accounts.login("alice", "pw1").await.unwrap();
        let second = accounts.login("alice", "pw1").await.unwrap();
        assert_ne!(first.access, second.access);
        assert_ne!(first.refresh, second.refresh);
    }

    #[tokio::test]
    async fn test_register_duplicate_login_regardless_of_password() {
        let (accounts, _, _) = directory();
        accounts.register("alice", "pw1").await.unwrap();

        let result = accounts.register("alice", "something-else").await;
        assert!(matches!(result, Err(AccountError::AlreadyExists)));
    }

    #[tokio::test]
    async fn test_stored_hash_is_not_plaintext() {
        let (accounts, _, store) = directory();
        accounts.register("alice", "pw1").await.unwrap();

        let user = store.find_user_by_login("alice").await.unwrap().unwrap();
        assert_ne!(user.password_hash, "pw1");
        assert!(user.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (accounts, _, _) = directory();
        accounts.register("alice", "pw1").await.unwrap();

        let wrong_password = accounts.login("alice", "nope").await.unwrap_err();
        let unknown_login = accounts.login("mallory", "pw1").await.unwrap_err();

        assert!(matches!(wrong_password, AccountError::Unauthorized));
        assert!(matches!(unknown_login, AccountError::Unauthorized));
        assert_eq!(wrong_password.to_string(), unknown_login.to_string());
    }

    #[test]
    fn test_store_conflict_maps_to_already_exists() {
        let err = AccountError::from(StoreError::Conflict("users_login_key".to_string()));
        assert!(matches!(err, AccountError::AlreadyExists));
    }
}
