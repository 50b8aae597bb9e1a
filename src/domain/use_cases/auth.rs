use uuid::Uuid;
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::entities::token::AuthResponse;
use crate::entities::user::{LoginUser, NewUser, NewUserResponse, PublicUser, User};
use crate::errors::{AppError, AuthError};
use crate::repositories::token::TokenService;
use crate::repositories::user::UserRepository;

pub struct AuthHandler<R, T>
where
    R: UserRepository,
    T: TokenService,
{
    pub user_repo: R,
    pub token_service: T,
}

impl<R, T> AuthHandler<R, T>
where
    R: UserRepository,
    T: TokenService,
{
    pub fn new(user_repo: R, token_service: T) -> Self {
        AuthHandler {
            user_repo,
            token_service,
        }
    }

    /// Registers a visitor account after validation and password hashing
    pub async fn register(&self, request: NewUser) -> Result<NewUserResponse, AppError> {
        request.validate()?;

        let hashed_password = hash_password(&request.password)?;
        let user_insert = request.prepare_for_insert(hashed_password);

        let id = self.user_repo.create_user(&user_insert).await?;
        tracing::info!(user_id = %id, "User registered");

        Ok(NewUserResponse {
            id,
            message: "User created successfully".to_string(),
        })
    }

    /// Checks credentials and issues an access/refresh token pair
    pub async fn login(&self, request: LoginUser) -> Result<AuthResponse, AuthError> {
        request.validate()?;

        let user = self
            .user_repo
            .get_user_by_email(&request.email)
            .await
            .map_err(|e| {
                tracing::error!("User lookup failed during login: {}", e);
                AuthError::WrongCredentials
            })?
            .ok_or(AuthError::WrongCredentials)?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AuthError::WrongCredentials);
        }

        let response = self.create_auth_response(&user)?;

        tracing::info!(user_id = %user.id, admin = user.is_admin, "User logged in");
        Ok(response)
    }

    pub fn create_auth_response(&self, user: &User) -> Result<AuthResponse, AuthError> {
        let access_token = self.token_service.create_jwt(user).map_err(|e| {
            tracing::warn!("Failed to create JWT: {}", e);
            AuthError::TokenCreation
        })?;

        let refresh_token = self.token_service.create_refresh_jwt(&user.id).map_err(|e| {
            tracing::warn!("Failed to create refresh JWT: {}", e);
            AuthError::TokenCreation
        })?;

        Ok(AuthResponse::new(access_token, refresh_token))
    }

    /// Exchanges a refresh token for a new token pair
    pub async fn refresh_token(&self, token: &str) -> Result<AuthResponse, AuthError> {
        let decoded = self.token_service.decode_refresh_jwt(token)?;
        let user_id = Uuid::parse_str(&decoded.claims.sub).map_err(|_| AuthError::InvalidUserId)?;

        let user = self
            .user_repo
            .get_user_by_id(&user_id)
            .await
            .map_err(|_| AuthError::WrongCredentials)?
            .ok_or(AuthError::WrongCredentials)?;

        self.create_auth_response(&user)
    }

    /// Profile of the token's subject
    pub async fn me(&self, subject: &str) -> Result<PublicUser, AppError> {
        let user_id = Uuid::parse_str(subject).map_err(|_| AppError::UnauthorizedAccess)?;

        self.user_repo
            .get_user_by_id(&user_id)
            .await?
            .map(PublicUser::from)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
