//! Authentication Service
//!
//! Handles registration, login and JWT access token validation.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtSettings;
use crate::domain::{User, UserRepository};

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user and issue an access token
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, AuthTokens), AuthError>;

    /// Authenticate user with credentials
    async fn login(&self, email: &str, password: &str) -> Result<(User, AuthTokens), AuthError>;

    /// Validate access token and extract user ID
    async fn validate_token(&self, access_token: &str) -> Result<Uuid, AuthError>;

    /// Load the authenticated user
    async fn get_current_user(&self, user_id: Uuid) -> Result<User, AuthError>;
}

/// Issued access token
#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Email already exists")]
    EmailExists,

    #[error("Username already exists")]
    UsernameExists,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// AuthService implementation
pub struct AuthServiceImpl<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    jwt_settings: JwtSettings,
}

impl<U> AuthServiceImpl<U>
where
    U: UserRepository,
{
    /// Create a new AuthServiceImpl
    pub fn new(user_repo: Arc<U>, jwt_settings: JwtSettings) -> Self {
        Self {
            user_repo,
            jwt_settings,
        }
    }

    /// Hash a password using Argon2id
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against its hash
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn generate_token(&self, user_id: Uuid) -> Result<AuthTokens, AuthError> {
        let now = Utc::now();
        let expiry = now + Duration::minutes(self.jwt_settings.access_token_expiry_minutes);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiry.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_settings.secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))?;

        Ok(AuthTokens {
            access_token,
            expires_in: self.jwt_settings.access_token_expiry_minutes * 60,
            token_type: "Bearer".to_string(),
        })
    }

    fn decode_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_settings.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?;

        Ok(token_data.claims)
    }
}

#[async_trait]
impl<U> AuthService for AuthServiceImpl<U>
where
    U: UserRepository + 'static,
{
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, AuthTokens), AuthError> {
        if self
            .user_repo
            .email_exists(email)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
        {
            return Err(AuthError::EmailExists);
        }

        if self
            .user_repo
            .username_exists(username)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
        {
            return Err(AuthError::UsernameExists);
        }

        let password_hash = self.hash_password(password)?;

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            created_at: Utc::now(),
        };

        let created_user = self
            .user_repo
            .create(&user)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let tokens = self.generate_token(created_user.id)?;

        tracing::info!(user_id = %created_user.id, "User registered");

        Ok((created_user, tokens))
    }

    async fn login(&self, email: &str, password: &str) -> Result<(User, AuthTokens), AuthError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.generate_token(user.id)?;

        Ok((user, tokens))
    }

    async fn validate_token(&self, access_token: &str) -> Result<Uuid, AuthError> {
        let claims = self.decode_access_token(access_token)?;

        claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| AuthError::InvalidToken)
    }

    async fn get_current_user(&self, user_id: Uuid) -> Result<User, AuthError> {
        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::UserNotFound)
    }
}
