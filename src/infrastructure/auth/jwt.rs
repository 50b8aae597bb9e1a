use jsonwebtoken::{encode, Header, decode, Validation, TokenData, Algorithm};
use chrono::{Utc, Duration};
use uuid::Uuid;

use crate::entities::token::{Claims, RefreshClaims};
use crate::entities::user::User;
use crate::repositories::token::TokenService;
use crate::settings::{AppConfig, JwtKeys};
use crate::errors::AuthError;

const JWT_ALGORITHM: Algorithm = Algorithm::HS512;

#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    access_expiration: Duration,
    refresh_expiration: Duration,
}

impl JwtService {
    pub fn new(config: &AppConfig) -> Self {
        JwtService {
            keys: JwtKeys::from(config),
            access_expiration: Duration::minutes(config.jwt_expiration_minutes),
            refresh_expiration: Duration::days(config.refresh_token_exp_days),
        }
    }

    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_expiration.num_seconds()
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation
    }
}

impl TokenService for JwtService {
    fn create_jwt(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            admin: user.is_admin,
            exp: (now + self.access_expiration).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.keys.encoding).map_err(|e| {
            tracing::warn!("Failed to encode access token: {}", e);
            AuthError::TokenCreation
        })
    }

    fn create_refresh_jwt(&self, user_id: &Uuid) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = RefreshClaims {
            sub: user_id.to_string(),
            exp: (now + self.refresh_expiration).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.keys.refresh_encoding).map_err(|e| {
            tracing::warn!("Failed to encode refresh token: {}", e);
            AuthError::TokenCreation
        })
    }

    fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError> {
        decode::<Claims>(token, &self.keys.decoding, &Self::validation()).map_err(AuthError::from)
    }

    fn decode_refresh_jwt(&self, token: &str) -> Result<TokenData<RefreshClaims>, AuthError> {
        decode::<RefreshClaims>(token, &self.keys.refresh_decoding, &Self::validation()).map_err(AuthError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{AppConfig, AppEnvironment};

    fn service() -> JwtService {
        let config = AppConfig {
            env: AppEnvironment::Testing,
            name: "test".into(),
            port: 0,
            host: "127.0.0.1".into(),
            worker_count: 1,
            database_url: "postgres://localhost/test".into(),
            database_max_connections: 1,
            cors_allowed_origins: vec![],
            jwt_secret: "a".repeat(64),
            jwt_expiration_minutes: 5,
            refresh_token_secret: "b".repeat(64),
            refresh_token_exp_days: 1,
            contact_email: "owner@example.com".into(),
            default_from_email: "noreply@example.com".into(),
            mail_api_url: None,
            mail_api_key: None,
            mail_timeout_secs: 1,
            send_confirmation_copy: false,
            static_url: "/static/".into(),
            secure_cookies: false,
        };
        JwtService::new(&config)
    }

    fn user(admin: bool) -> User {
        User {
            id: Uuid::new_v4(),
            email: "ada@example.com".into(),
            username: "ada".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            avatar_url: None,
            password_hash: String::new(),
            is_admin: admin,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn access_token_carries_admin_flag() {
        let jwt = service();
        let admin = user(true);

        let token = jwt.create_jwt(&admin).unwrap();
        let claims = jwt.decode_jwt(&token).unwrap().claims;

        assert_eq!(claims.sub, admin.id.to_string());
        assert!(claims.admin);
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let jwt = service();
        let refresh = jwt.create_refresh_jwt(&Uuid::new_v4()).unwrap();

        assert!(matches!(jwt.decode_jwt(&refresh), Err(AuthError::InvalidToken)));
    }
}
