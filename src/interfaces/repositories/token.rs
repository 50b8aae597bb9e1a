use jsonwebtoken::TokenData;
use uuid::Uuid;

use crate::{entities::{token::{Claims, RefreshClaims}, user::User}, errors::AuthError};

#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Creates a short-lived access token carrying the admin flag
    fn create_jwt(&self, user: &User) -> Result<String, AuthError>;

    /// Creates a refresh token for the user
    fn create_refresh_jwt(&self, user_id: &Uuid) -> Result<String, AuthError>;

    fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError>;

    fn decode_refresh_jwt(&self, token: &str) -> Result<TokenData<RefreshClaims>, AuthError>;
}
