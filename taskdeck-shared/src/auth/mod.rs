/// Authentication primitives
///
/// - [`password`]: argon2id password hashing and strength policy
/// - [`jwt`]: HS256 access/refresh token generation and validation
///
/// The API crate's middleware validates a bearer token and injects a
/// [`CurrentUser`] into request extensions; handlers treat that identity
/// as verified and use it as the owner for every task operation.

use uuid::Uuid;

pub mod jwt;
pub mod password;

/// Verified caller identity for one request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Authenticated user ID
    pub id: Uuid,

    /// Email carried in the token claims
    pub email: String,
}

impl From<jwt::Claims> for CurrentUser {
    fn from(claims: jwt::Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
        }
    }
}
