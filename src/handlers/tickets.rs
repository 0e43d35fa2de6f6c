use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::handlers::json_body;
use crate::models::Ticket;
use crate::services::tickets;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success};

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub length: Option<Value>,
}

#[derive(Debug, Serialize)]
struct IssuedTicketView {
    #[serde(flatten)]
    ticket: Ticket,
    profile_name: String,
    warning: Option<String>,
}

/// Accepts a JSON integer or a numeric string, as form posts send.
fn parse_length(raw: Option<&Value>) -> Result<i64, AppError> {
    let invalid = || AppError::InvalidInput("Length must be a positive number.".to_string());
    match raw {
        None | Some(Value::Null) => Err(AppError::InvalidInput("Length is required.".to_string())),
        Some(Value::Number(n)) => n.as_i64().ok_or_else(invalid),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(AppError::InvalidInput("Length is required.".to_string()))
        }
        Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

pub async fn create_ticket(
    State(state): State<AppState>,
    Path(profile_id): Path<i64>,
    body: Result<Json<CreateTicketRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let request = json_body(body)?;
    let length = parse_length(request.length.as_ref())?;

    let issued =
        tickets::issue_ticket(&state.pool, state.notifier.as_ref(), profile_id, length).await?;
    let message = match &issued.warning {
        None => format!(
            "Ticket created with PIN {} and script executed successfully!",
            issued.ticket.lock_code
        ),
        Some(_) => format!(
            "Ticket created with PIN {}, but script execution failed. Check logs.",
            issued.ticket.lock_code
        ),
    };

    Ok(created(
        IssuedTicketView {
            ticket: issued.ticket,
            profile_name: issued.profile_name,
            warning: issued.warning,
        },
        message,
    ))
}

pub async fn delete_ticket(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    tickets::delete_ticket(&state.pool, id).await?;
    Ok(empty_success("Ticket deleted successfully!"))
}
