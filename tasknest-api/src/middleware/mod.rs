/// Middleware modules for the API server
///
/// - `auth`: Access gate for access and refresh tokens
/// - `security`: Security response headers

pub mod auth;
pub mod security;
