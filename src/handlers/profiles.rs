use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::handlers::json_body;
use crate::services::profiles;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
struct DeletedProfile {
    id: i64,
    name: String,
    tickets_deleted: u64,
}

pub async fn list_profiles(State(state): State<AppState>) -> Result<Response, AppError> {
    let profiles = profiles::list_profiles(&state.pool).await?;
    Ok(success(profiles, "Profiles"))
}

pub async fn create_profile(
    State(state): State<AppState>,
    body: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let request = json_body(body)?;
    let profile = profiles::create_profile(&state.pool, &request.name).await?;
    let message = format!("Profile \"{}\" created successfully!", profile.name);
    Ok(created(profile, message))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let detail = profiles::get_profile(&state.pool, id).await?;
    Ok(success(detail, "Profile"))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let request = json_body(body)?;
    let profile = profiles::rename_profile(&state.pool, id, &request.name).await?;
    let message = format!("Profile \"{}\" updated successfully!", profile.name);
    Ok(success(profile, message))
}

pub async fn delete_profile(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let (profile, tickets_deleted) = profiles::delete_profile(&state.pool, id).await?;
    let message = format!(
        "Profile \"{}\" and all its tickets deleted successfully!",
        profile.name
    );
    Ok(success(
        DeletedProfile {
            id: profile.id,
            name: profile.name,
            tickets_deleted,
        },
        message,
    ))
}
