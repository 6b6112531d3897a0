//! Auth module
//!
//! User registration and login with salted SHA-256 password hashes, plus the
//! visitor-flag lookup used by the client to decide which UI to render.

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

/// Registered user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Visitors can browse and review portfolios but do not own one
    pub visitor: bool,
    pub created_at: DateTime<Utc>,
}

/// Auth errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("User already exists")]
    UserAlreadyExists,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<AuthError> for crate::error::AppError {
    fn from(e: AuthError) -> Self {
        use crate::error::AppError;
        match e {
            AuthError::UserAlreadyExists => AppError::UserAlreadyExists,
            AuthError::UserNotFound(email) => AppError::UserNotFound(email),
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::Database(e) => AppError::Database(e),
        }
    }
}

/// Service for user accounts
#[derive(Debug, Clone)]
pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new user. Fails if the email is already taken.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        visitor: bool,
    ) -> Result<Uuid, AuthError> {
        let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let id = Uuid::new_v4();
        let salt = generate_salt();
        let password_hash = hash_password(password, &salt);

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, password_salt, visitor, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(&password_hash)
        .bind(&salt)
        .bind(visitor)
        .execute(&self.pool)
        .await?;

        tracing::info!(email = %email, visitor = visitor, "User registered");

        Ok(id)
    }

    /// Verify credentials for a login attempt.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let row: Option<(String, String)> = sqlx::query_as(
            "SELECT password_hash, password_salt FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let (stored_hash, salt) = row.ok_or_else(|| AuthError::UserNotFound(email.to_string()))?;

        if hash_password(password, &salt) != stored_hash {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(())
    }

    /// Fetch a user account by email.
    pub async fn get_user(&self, email: &str) -> Result<Option<User>, AuthError> {
        let row: Option<(Uuid, String, String, bool, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT id, name, email, visitor, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, name, email, visitor, created_at)| User {
            id,
            name,
            email,
            visitor,
            created_at,
        }))
    }
}

/// Hash a password with its salt (hex-encoded SHA-256)
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a random 16-byte hex salt
fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
