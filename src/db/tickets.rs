use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;

use crate::models::{Ticket, TicketInfo};

const COLUMNS: &str = "id, profile_id, lock_code, length, is_active, used_at, created_at";

/// True when any ticket, active or used, already holds `lock_code`.
pub async fn lock_code_exists<'e, E: SqliteExecutor<'e>>(
    db: E,
    lock_code: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tickets WHERE lock_code = ?)")
        .bind(lock_code)
        .fetch_one(db)
        .await
}

pub async fn insert<'e, E: SqliteExecutor<'e>>(
    db: E,
    profile_id: i64,
    lock_code: &str,
    length: i64,
) -> Result<Ticket, sqlx::Error> {
    sqlx::query_as(&format!(
        "INSERT INTO tickets (profile_id, lock_code, length, is_active, created_at) \
         VALUES (?, ?, ?, 1, ?) RETURNING {COLUMNS}"
    ))
    .bind(profile_id)
    .bind(lock_code)
    .bind(length)
    .bind(Utc::now())
    .fetch_one(db)
    .await
}

pub async fn list_for_profile<'e, E: SqliteExecutor<'e>>(
    db: E,
    profile_id: i64,
) -> Result<Vec<Ticket>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM tickets WHERE profile_id = ? ORDER BY created_at DESC, id DESC"
    ))
    .bind(profile_id)
    .fetch_all(db)
    .await
}

pub async fn find_info_by_lock_code<'e, E: SqliteExecutor<'e>>(
    db: E,
    lock_code: &str,
) -> Result<Option<TicketInfo>, sqlx::Error> {
    sqlx::query_as(
        "SELECT t.id, t.profile_id, p.name AS profile_name, t.lock_code, t.length, \
                t.is_active, t.used_at, t.created_at \
         FROM tickets t JOIN profiles p ON p.id = t.profile_id \
         WHERE t.lock_code = ?",
    )
    .bind(lock_code)
    .fetch_optional(db)
    .await
}

/// Flips the active ticket holding `lock_code` to used in a single
/// conditional statement. `None` when no active ticket matches, including
/// when a concurrent redemption got there first.
pub async fn mark_used<'e, E: SqliteExecutor<'e>>(
    db: E,
    lock_code: &str,
    used_at: DateTime<Utc>,
) -> Result<Option<Ticket>, sqlx::Error> {
    sqlx::query_as(&format!(
        "UPDATE tickets SET is_active = 0, used_at = ? \
         WHERE lock_code = ? AND is_active = 1 RETURNING {COLUMNS}"
    ))
    .bind(used_at)
    .bind(lock_code)
    .fetch_optional(db)
    .await
}

pub async fn delete<'e, E: SqliteExecutor<'e>>(db: E, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tickets WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_for_profile<'e, E: SqliteExecutor<'e>>(
    db: E,
    profile_id: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tickets WHERE profile_id = ?")
        .bind(profile_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
