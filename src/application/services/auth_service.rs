//! Account registration, login and session tokens.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::entities::{NewUser, User};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::utils::password::{hash_password, verify_password};

/// HS256 keys derived from the configured secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// A signed-in user together with a fresh token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Service for account management and bearer token authentication.
///
/// Passwords are stored as argon2 hashes; sessions are stateless HS256 JWTs
/// valid for `token_ttl_seconds`.
pub struct AuthService<U: UserRepository + ?Sized> {
    repository: Arc<U>,
    keys: JwtKeys,
    token_ttl_seconds: i64,
}

impl<U: UserRepository + ?Sized> AuthService<U> {
    pub fn new(repository: Arc<U>, secret: &str, token_ttl_seconds: i64) -> Self {
        Self {
            repository,
            keys: JwtKeys::new(secret.as_bytes()),
            token_ttl_seconds,
        }
    }

    /// Registers a new account and signs it in.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the email or username is taken.
    pub async fn register(&self, input: RegisterUser) -> Result<AuthSession, AppError> {
        let email = normalize_email(&input.email);
        let username = input.username.trim().to_string();

        if self.repository.exists_by_email(&email).await? {
            return Err(AppError::conflict(
                "Email already registered",
                json!({ "field": "email" }),
            ));
        }

        if self.repository.exists_by_username(&username).await? {
            return Err(AppError::conflict(
                "Username already taken",
                json!({ "field": "username" }),
            ));
        }

        let user = self
            .repository
            .create(NewUser {
                id: Uuid::new_v4(),
                username,
                email,
                password_hash: hash_password(&input.password)?,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");

        self.session_for(user)
    }

    /// Verifies credentials and signs the user in.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let user = self
            .repository
            .find_by_email(&normalize_email(email))
            .await?
            .filter(|user| verify_password(&user.password_hash, password))
            .ok_or_else(|| AppError::unauthorized("Invalid credentials", json!({})))?;

        tracing::info!(user_id = %user.id, "User logged in");

        self.session_for(user)
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<User, AppError> {
        self.repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found", json!({ "id": user_id })))
    }

    /// Validates a bearer token and returns its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.keys.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                AppError::unauthorized(
                    "Unauthorized",
                    json!({ "reason": format!("Invalid token: {e}") }),
                )
            })
    }

    /// Signs a token for `user`.
    pub fn issue_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            iat: now,
            exp: now + self.token_ttl_seconds,
        };

        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::default(), claims, &self.keys.encoding).map_err(|e| {
            AppError::internal("Failed to sign token", json!({ "reason": e.to_string() }))
        })
    }

    fn session_for(&self, user: User) -> Result<AuthSession, AppError> {
        let token = self.issue_token(&user)?;
        Ok(AuthSession {
            user,
            token,
            expires_in: self.token_ttl_seconds,
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
