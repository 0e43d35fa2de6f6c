use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::ticket::Ticket;
use crate::utils::timefmt;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Profile {
    pub id: i64,
    pub name: String,
    #[serde(serialize_with = "timefmt::serialize")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "timefmt::serialize")]
    pub updated_at: DateTime<Utc>,
}

/// A profile together with every ticket it owns, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileDetail {
    #[serde(flatten)]
    pub profile: Profile,
    pub tickets: Vec<Ticket>,
}
