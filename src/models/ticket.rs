use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::utils::timefmt;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Ticket {
    pub id: i64,
    pub profile_id: i64,
    pub lock_code: String,
    /// Validity in minutes, counted from redemption.
    pub length: i64,
    pub is_active: bool,
    #[serde(serialize_with = "timefmt::option::serialize")]
    pub used_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "timefmt::serialize")]
    pub created_at: DateTime<Utc>,
}

/// Ticket joined with its owning profile's name.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TicketInfo {
    pub id: i64,
    pub profile_id: i64,
    pub profile_name: String,
    pub lock_code: String,
    pub length: i64,
    pub is_active: bool,
    #[serde(serialize_with = "timefmt::option::serialize")]
    pub used_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "timefmt::serialize")]
    pub created_at: DateTime<Utc>,
}

/// Outcome of a successful redemption.
#[derive(Debug, Clone)]
pub struct Redemption {
    pub ticket: Ticket,
    pub profile_name: String,
    pub used_at: DateTime<Utc>,
}

impl Redemption {
    /// End of the access window `[used_at, used_at + length)`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.used_at + Duration::minutes(self.ticket.length)
    }
}
