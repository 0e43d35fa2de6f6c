use chrono::Utc;
use sqlx::SqliteExecutor;

use crate::models::Profile;

const COLUMNS: &str = "id, name, created_at, updated_at";

pub async fn list<'e, E: SqliteExecutor<'e>>(db: E) -> Result<Vec<Profile>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM profiles ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(db)
    .await
}

pub async fn find<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: i64,
) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {COLUMNS} FROM profiles WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_by_name<'e, E: SqliteExecutor<'e>>(
    db: E,
    name: &str,
) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {COLUMNS} FROM profiles WHERE name = ?"))
        .bind(name)
        .fetch_optional(db)
        .await
}

pub async fn insert<'e, E: SqliteExecutor<'e>>(db: E, name: &str) -> Result<Profile, sqlx::Error> {
    let now = Utc::now();
    sqlx::query_as(&format!(
        "INSERT INTO profiles (name, created_at, updated_at) VALUES (?, ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(name)
    .bind(now)
    .bind(now)
    .fetch_one(db)
    .await
}

pub async fn rename<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: i64,
    name: &str,
) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as(&format!(
        "UPDATE profiles SET name = ?, updated_at = ? WHERE id = ? RETURNING {COLUMNS}"
    ))
    .bind(name)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(db)
    .await
}

/// Returns the deleted row, if there was one.
pub async fn delete<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: i64,
) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as(&format!("DELETE FROM profiles WHERE id = ? RETURNING {COLUMNS}"))
        .bind(id)
        .fetch_optional(db)
        .await
}
