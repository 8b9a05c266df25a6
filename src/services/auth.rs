use std::sync::Mutex;

use anyhow::Context;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Account, Role};

// ── Passwords ──

/// Hashes off the async workers; bcrypt at a real cost takes tens of milliseconds.
pub async fn hash_password(password: String, cost: u32) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .context("password hashing task failed")?
        .context("failed to hash password")
}

/// Checks `password` against `stored`. A missing hash still costs one bcrypt
/// round so unknown accounts answer as slowly as known ones.
pub async fn verify_password(password: String, stored: Option<String>, cost: u32) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || match stored {
        Some(hash) => Ok(bcrypt::verify(password, &hash).unwrap_or(false)),
        None => bcrypt::hash(password, cost).map(|_| false),
    })
    .await
    .context("password verification task failed")?
    .context("failed to verify password")
}

// ── Tokens ──

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

pub fn issue_token(secret: &str, email: &str, role: Role, ttl_hours: i64) -> anyhow::Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: email.to_string(),
        role,
        exp: (now + Duration::hours(ttl_hours)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("failed to sign token")
}

/// Returns the claims of an untampered, unexpired HS256 token.
pub fn verify_token(secret: &str, token: &str) -> Option<Claims> {
    let validation = Validation::new(Algorithm::HS256);
    match decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            tracing::debug!(error = %e, "rejected bearer token");
            None
        }
    }
}

// ── Accounts ──

/// Creates an admin account for an email listed in the role directory.
pub async fn register(
    db: &Mutex<Connection>,
    config: &AppConfig,
    email: &str,
    username: &str,
    password: &str,
) -> Result<Role, AppError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || username.trim().is_empty() || password.is_empty() {
        return Err(AppError::Validation("email, username and password are required".to_string()));
    }

    let role = config
        .roles
        .role_for(&email)
        .ok_or_else(|| AppError::Forbidden("email not allowed for registration".to_string()))?;

    let account = Account {
        email: email.clone(),
        username: username.trim().to_string(),
        password_hash: hash_password(password.to_string(), config.bcrypt_cost).await?,
        role,
        created_at: Utc::now().naive_utc(),
    };

    let created = {
        let conn = db.lock().unwrap();
        queries::create_account(&conn, &account)?
    };
    if !created {
        return Err(AppError::Conflict(format!("account already exists: {email}")));
    }

    tracing::info!(email = %email, role = role.as_str(), "registered admin account");
    Ok(role)
}

/// Checks credentials and issues a bearer token.
pub async fn login(
    db: &Mutex<Connection>,
    config: &AppConfig,
    email: &str,
    password: &str,
) -> Result<(String, Role), AppError> {
    let email = email.trim().to_lowercase();
    let account = {
        let conn = db.lock().unwrap();
        queries::get_account(&conn, &email)?
    };

    let stored = account.as_ref().map(|a| a.password_hash.clone());
    let matches = verify_password(password.to_string(), stored, config.bcrypt_cost).await?;

    let account = match account {
        Some(account) if matches => account,
        _ => {
            tracing::warn!(email = %email, "rejected admin login");
            return Err(AppError::Unauthorized);
        }
    };

    let token = issue_token(
        &config.token_secret,
        &account.email,
        account.role,
        config.token_ttl_hours,
    )?;
    Ok((token, account.role))
}
