use chrono::Utc;
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::entities::token::{AuthResponse, AuthSession, Claims, RefreshTokenRequest};
use crate::entities::user::{
    normalize_email, ChangePasswordRequest, LoginUser, NewUser, PublicUser, UpdateProfileRequest, User,
};
use crate::errors::{AppError, AuthError};
use crate::repositories::token::TokenServiceRepository;
use crate::repositories::user::UserRepository;

pub struct AuthHandler<R, T>
where
    R: UserRepository,
    T: TokenServiceRepository,
{
    pub user_repo: R,
    pub token_service: T,
}

impl<R, T> AuthHandler<R, T>
where
    R: UserRepository,
    T: TokenServiceRepository,
{
    pub fn new(user_repo: R, token_service: T) -> Self {
        AuthHandler {
            user_repo,
            token_service,
        }
    }

    /// Registers a student account and signs it in.
    pub async fn register(&self, request: NewUser) -> Result<AuthSession, AppError> {
        let request = request.normalized();
        request.validate()?;

        if self.user_repo.email_exists(&request.email).await? {
            tracing::warn!("Registration rejected: email already in use");
            return Err(AppError::Conflict("User with this email already exists".to_string()));
        }

        let hashed_password = hash_password(&request.password)?;
        let user_insert = request.prepare_for_insert(hashed_password);
        let user = self.user_repo.create_user(&user_insert).await?;

        tracing::info!(user_id = %user.id, "User registered");
        let tokens = self.create_auth_response(&user)?;
        Ok(AuthSession {
            tokens,
            user: user.into(),
        })
    }

    /// Logs in a user by validating credentials and generating JWTs
    pub async fn login(&self, mut request: LoginUser) -> Result<AuthSession, AppError> {
        request.email = normalize_email(&request.email);
        request.validate()?;

        let mut user = self
            .user_repo
            .get_user_by_email(&request.email)
            .await?
            .ok_or(AuthError::WrongCredentials)?;

        let is_password_valid =
            verify_password(&request.password, &user.password_hash).map_err(|_| AuthError::WrongCredentials)?;
        if !is_password_valid {
            tracing::warn!("Login failed: wrong credentials");
            return Err(AuthError::WrongCredentials.into());
        }

        if !user.is_active {
            return Err(AuthError::AccountDisabled.into());
        }

        self.user_repo.record_login(&user.id).await?;
        user.last_login = Some(Utc::now());

        let tokens = self.create_auth_response(&user)?;

        tracing::info!(user_id = %user.id, "User logged in successfully");
        Ok(AuthSession {
            tokens,
            user: user.into(),
        })
    }

    /// Create auth response
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

    /// Exchanges a refresh token for a fresh token pair.
    pub async fn refresh_token(&self, request: RefreshTokenRequest) -> Result<AuthResponse, AppError> {
        let decoded = self.token_service.decode_refresh_jwt(request.refresh_token.trim())?;
        let user_id = uuid::Uuid::parse_str(&decoded.claims.sub).map_err(|_| AuthError::InvalidUserId)?;

        let user = self
            .user_repo
            .get_user_by_id(&user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if !user.is_active {
            return Err(AuthError::AccountDisabled.into());
        }

        Ok(self.create_auth_response(&user)?)
    }

    /// Resolves verified claims to an active user.
    pub async fn current_user(&self, claims: &Claims) -> Result<User, AuthError> {
        let user_id = claims.user_id()?;
        let user = self
            .user_repo
            .get_user_by_id(&user_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to load authenticated user");
                AuthError::InvalidToken
            })?
            .ok_or(AuthError::InvalidToken)?;

        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }
        Ok(user)
    }

    pub async fn update_profile(&self, user: &User, request: UpdateProfileRequest) -> Result<PublicUser, AppError> {
        let request = request.normalized();
        request.validate()?;

        let updated = self
            .user_repo
            .update_profile(&user.id, &request)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(updated.into())
    }

    pub async fn change_password(&self, user: &User, request: ChangePasswordRequest) -> Result<(), AppError> {
        request.validate()?;

        if !verify_password(&request.current_password, &user.password_hash)? {
            return Err(AppError::BadRequest("Current password is incorrect".to_string()));
        }

        let hashed_password = hash_password(&request.new_password)?;
        self.user_repo.update_password(&user.id, &hashed_password).await?;

        tracing::info!(user_id = %user.id, "Password changed");
        Ok(())
    }
}
