use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::db::{profiles, tickets};
use crate::models::{Redemption, Ticket, TicketInfo};
use crate::notify::Notifier;
use crate::services::pin::{self, PIN_ATTEMPTS};
use crate::utils::error::{is_busy, is_foreign_key_violation, is_unique_violation, AppError};

/// One year. Keeps `used_at + length` far from chrono's range limits.
pub const MAX_LENGTH_MINUTES: i64 = 525_600;

#[derive(Debug, Clone)]
pub struct IssuedTicket {
    pub ticket: Ticket,
    pub profile_name: String,
    /// Set when the notifier failed. The ticket exists regardless.
    pub warning: Option<String>,
}

pub fn validate_length(length: i64) -> Result<i64, AppError> {
    if length <= 0 {
        return Err(AppError::InvalidInput(
            "Length must be a positive number.".to_string(),
        ));
    }
    if length > MAX_LENGTH_MINUTES {
        return Err(AppError::InvalidInput(format!(
            "Length must not exceed {MAX_LENGTH_MINUTES} minutes."
        )));
    }
    Ok(length)
}

/// Creates a ticket with a fresh lock code for `profile_id`, then fires the
/// notifier.
///
/// Each draw is an autocommit check followed by an autocommit insert, so no
/// connection ever holds a read lock while waiting to write. The UNIQUE index
/// on `lock_code` settles races between concurrent issuers.
pub async fn issue_ticket(
    pool: &SqlitePool,
    notifier: &dyn Notifier,
    profile_id: i64,
    length: i64,
) -> Result<IssuedTicket, AppError> {
    let length = validate_length(length)?;

    let profile = profiles::find(pool, profile_id)
        .await?
        .ok_or_else(|| profile_not_found(profile_id))?;
    let ticket = insert_with_unique_pin(pool, profile.id, length).await?;

    info!(
        ticket_id = ticket.id,
        profile = %profile.name,
        length,
        "Ticket issued"
    );

    let warning = match notifier.ticket_issued(&profile.name, &ticket.lock_code).await {
        Ok(()) => None,
        Err(e) => {
            warn!(ticket_id = ticket.id, error = %e, "Ticket notifier failed");
            Some(format!(
                "Ticket created with PIN {}, but script execution failed: {e}",
                ticket.lock_code
            ))
        }
    };

    Ok(IssuedTicket {
        ticket,
        profile_name: profile.name,
        warning,
    })
}

fn profile_not_found(profile_id: i64) -> AppError {
    AppError::NotFound(format!("Profile {profile_id} not found"))
}

async fn insert_with_unique_pin(
    pool: &SqlitePool,
    profile_id: i64,
    length: i64,
) -> Result<Ticket, AppError> {
    for attempt in 1..=PIN_ATTEMPTS {
        let code = pin::generate_pin(&mut rand::thread_rng());
        match tickets::lock_code_exists(pool, &code).await {
            Ok(false) => {}
            Ok(true) => continue,
            Err(e) if is_busy(&e) => {
                debug!(attempt, "Lock code check hit a busy database");
                continue;
            }
            Err(e) => return Err(e.into()),
        }
        match tickets::insert(pool, profile_id, &code, length).await {
            Ok(ticket) => {
                debug!(attempt, lock_code = %code, "Lock code allocated");
                return Ok(ticket);
            }
            // another issuance took the code between check and insert
            Err(e) if is_unique_violation(&e) => continue,
            Err(e) if is_busy(&e) => {
                debug!(attempt, "Ticket insert hit a busy database");
                continue;
            }
            // profile deleted after it was looked up
            Err(e) if is_foreign_key_violation(&e) => return Err(profile_not_found(profile_id)),
            Err(e) => return Err(e.into()),
        }
    }
    Err(AppError::ExhaustedKeyspace(PIN_ATTEMPTS))
}

/// Consumes the active ticket holding `lock_code`. Exactly one caller wins
/// for any given ticket; everyone else sees `NotFound`.
pub async fn redeem_ticket(pool: &SqlitePool, lock_code: &str) -> Result<Redemption, AppError> {
    let mut tx = pool.begin().await?;
    let ticket = tickets::mark_used(&mut *tx, lock_code, Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid or inactive ticket".to_string()))?;
    let profile = profiles::find(&mut *tx, ticket.profile_id)
        .await?
        .ok_or_else(|| {
            AppError::InternalServerError(format!("ticket {} has no profile", ticket.id))
        })?;
    tx.commit().await?;

    let used_at = ticket.used_at.ok_or_else(|| {
        AppError::InternalServerError(format!("ticket {} redeemed without timestamp", ticket.id))
    })?;
    let redemption = Redemption {
        ticket,
        profile_name: profile.name,
        used_at,
    };
    info!(
        ticket_id = redemption.ticket.id,
        profile = %redemption.profile_name,
        length = redemption.ticket.length,
        "Ticket redeemed"
    );
    Ok(redemption)
}

pub async fn ticket_info(pool: &SqlitePool, lock_code: &str) -> Result<TicketInfo, AppError> {
    tickets::find_info_by_lock_code(pool, lock_code)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))
}

pub async fn delete_ticket(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    if !tickets::delete(pool, id).await? {
        return Err(AppError::NotFound(format!("Ticket {id} not found")));
    }
    info!(ticket_id = id, "Ticket deleted");
    Ok(())
}
