//! Machine-facing endpoints used by the media-center client. No session.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::handlers::json_body;
use crate::models::TicketInfo;
use crate::services::{pin, tickets};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::timefmt;

#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    /// Usually a string; clients that send a bare number get its decimal form.
    pub lock_code: Option<Value>,
}

fn lock_code_text(raw: Option<Value>) -> Result<String, AppError> {
    let code = match raw {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(code)) => code.trim().to_string(),
        Some(Value::Number(n)) if n.is_u64() => n.to_string(),
        Some(_) => return Err(malformed_lock_code()),
    };
    if code.is_empty() {
        return Err(AppError::InvalidInput("lock_code is required".to_string()));
    }
    if !pin::is_well_formed(&code) {
        return Err(malformed_lock_code());
    }
    Ok(code)
}

fn malformed_lock_code() -> AppError {
    AppError::InvalidInput("lock_code must be a 4-digit string".to_string())
}

#[derive(Debug, Serialize)]
pub struct RedeemResponse {
    pub success: bool,
    pub message: &'static str,
    pub profile: String,
    pub length: i64,
    #[serde(serialize_with = "timefmt::serialize")]
    pub used_at: DateTime<Utc>,
    #[serde(serialize_with = "timefmt::serialize")]
    pub expires_at: DateTime<Utc>,
}

/// `POST /api/login`: the client reports that a PIN was entered.
pub async fn register_login(
    State(state): State<AppState>,
    body: Result<Json<RedeemRequest>, JsonRejection>,
) -> Result<Json<RedeemResponse>, AppError> {
    let request = json_body(body)?;
    let lock_code = lock_code_text(request.lock_code)?;

    let redemption = tickets::redeem_ticket(&state.pool, &lock_code).await?;
    Ok(Json(RedeemResponse {
        success: true,
        message: "Login registered successfully",
        expires_at: redemption.expires_at(),
        profile: redemption.profile_name,
        length: redemption.ticket.length,
        used_at: redemption.used_at,
    }))
}

/// `GET /api/ticket/:lock_code`: current state, active or used.
pub async fn get_ticket_info(
    State(state): State<AppState>,
    Path(lock_code): Path<String>,
) -> Result<Json<TicketInfo>, AppError> {
    let info = tickets::ticket_info(&state.pool, &lock_code).await?;
    Ok(Json(info))
}
