use chrono::Utc;
use sqlx::SqliteExecutor;

use crate::models::Admin;

pub async fn count<'e, E: SqliteExecutor<'e>>(db: E) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM admins")
        .fetch_one(db)
        .await
}

pub async fn find_by_username<'e, E: SqliteExecutor<'e>>(
    db: E,
    username: &str,
) -> Result<Option<Admin>, sqlx::Error> {
    sqlx::query_as("SELECT id, username, password_hash, created_at FROM admins WHERE username = ?")
        .bind(username)
        .fetch_optional(db)
        .await
}

pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: i64,
) -> Result<Option<Admin>, sqlx::Error> {
    sqlx::query_as("SELECT id, username, password_hash, created_at FROM admins WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert<'e, E: SqliteExecutor<'e>>(
    db: E,
    username: &str,
    password_hash: &str,
) -> Result<Admin, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO admins (username, password_hash, created_at) VALUES (?, ?, ?) \
         RETURNING id, username, password_hash, created_at",
    )
    .bind(username)
    .bind(password_hash)
    .bind(Utc::now())
    .fetch_one(db)
    .await
}
