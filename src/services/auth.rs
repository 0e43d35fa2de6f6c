//! Administrator credentials and session tokens.
//!
//! A session is an HS256 JWT naming the administrator id; it carries its
//! own expiry, so nothing is kept server-side.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::db::admins;
use crate::models::Admin;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Administrator id.
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::InternalServerError(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

pub fn create_token(secret: &str, admin: &Admin, ttl_secs: u64) -> Result<String, AppError> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: admin.id.to_string(),
        username: admin.username.clone(),
        iat: now,
        exp: now.saturating_add(i64::try_from(ttl_secs).unwrap_or(i64::MAX)),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("token encoding failed: {e}")))
}

pub fn validate_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::Unauthorized("Session expired".to_string())
        }
        _ => AppError::Unauthorized("Invalid session".to_string()),
    })
}

/// Checks a username/password pair. Unknown users and wrong passwords are
/// indistinguishable to the caller.
pub async fn authenticate(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<Admin, AppError> {
    if username.is_empty() || password.is_empty() {
        return Err(AppError::InvalidInput(
            "username and password are required".to_string(),
        ));
    }

    let invalid = || AppError::Unauthorized("Invalid username or password.".to_string());
    let admin = admins::find_by_username(pool, username)
        .await?
        .ok_or_else(invalid)?;
    if !verify_password(password, &admin.password_hash) {
        return Err(invalid());
    }
    Ok(admin)
}

/// Resolves a validated session back to a live administrator row.
pub async fn session_admin(pool: &SqlitePool, claims: &Claims) -> Result<Admin, AppError> {
    let invalid = || AppError::Unauthorized("Invalid session".to_string());
    let id: i64 = claims.sub.parse().map_err(|_| invalid())?;
    admins::find_by_id(pool, id).await?.ok_or_else(invalid)
}

/// Seeds the default administrator when the table is empty.
pub async fn bootstrap_admin(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<Option<Admin>, AppError> {
    if admins::count(pool).await? > 0 {
        return Ok(None);
    }
    let hash = hash_password(password)?;
    let admin = admins::insert(pool, username, &hash).await?;
    info!(username = %admin.username, "Default administrator created");
    Ok(Some(admin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::pool;

    const SECRET: &str = "test-secret";

    #[tokio::test]
    async fn test_bootstrap_seeds_once() {
        let pool = pool().await;
        let created = bootstrap_admin(&pool, "admin", "admin123").await.unwrap();
        assert!(created.is_some());
        let again = bootstrap_admin(&pool, "other", "pw").await.unwrap();
        assert!(again.is_none());
        assert_eq!(admins::count(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_authenticate() {
        let pool = pool().await;
        bootstrap_admin(&pool, "admin", "admin123").await.unwrap();

        let admin = authenticate(&pool, "admin", "admin123").await.unwrap();
        assert_eq!(admin.username, "admin");

        let wrong = authenticate(&pool, "admin", "nope").await.unwrap_err();
        let unknown = authenticate(&pool, "ghost", "admin123").await.unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert!(matches!(wrong, AppError::Unauthorized(_)));

        let empty = authenticate(&pool, "", "").await.unwrap_err();
        assert!(matches!(empty, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_token_round_trip_maps_to_admin() {
        let pool = pool().await;
        let admin = bootstrap_admin(&pool, "admin", "admin123")
            .await
            .unwrap()
            .unwrap();

        let token = create_token(SECRET, &admin, 60).unwrap();
        let claims = validate_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, admin.id.to_string());
        assert_eq!(session_admin(&pool, &claims).await.unwrap().id, admin.id);

        assert!(validate_token("other-secret", &token).is_err());
        assert!(validate_token(SECRET, "garbage").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let admin = Admin {
            id: 1,
            username: "admin".to_string(),
            password_hash: String::new(),
            created_at: chrono::Utc::now(),
        };
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: admin.id.to_string(),
            username: admin.username,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = validate_token(SECRET, &token).unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized: Session expired");
    }
}
