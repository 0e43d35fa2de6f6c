use axum::extract::rejection::JsonRejection;
use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::handlers::json_body;
use crate::models::Admin;
use crate::services::auth;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{empty_success, success};

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: u64,
    pub admin: Admin,
}

fn session_cookie(token: &str, max_age: u64, secure: bool) -> Result<HeaderValue, AppError> {
    let mut cookie =
        format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::InternalServerError(format!("bad session cookie: {e}")))
}

/// Bearer header first, then the `session` cookie.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let request = json_body(body)?;
    let admin = auth::authenticate(&state.pool, &request.username, &request.password).await?;

    let ttl = state.config.session_ttl_secs;
    let token = auth::create_token(&state.config.secret_key, &admin, ttl)?;
    let cookie = session_cookie(&token, ttl, state.config.production)?;
    tracing::info!(admin_id = admin.id, "Administrator logged in");

    let mut response = success(
        LoginResponse {
            token,
            expires_in: ttl,
            admin,
        },
        "Login successful!",
    );
    response.headers_mut().insert(SET_COOKIE, cookie);
    Ok(response)
}

pub async fn logout(State(state): State<AppState>) -> Result<Response, AppError> {
    let mut response = empty_success("You have been logged out.");
    response
        .headers_mut()
        .insert(SET_COOKIE, session_cookie("", 0, state.config.production)?);
    Ok(response)
}

pub async fn me(Extension(admin): Extension<Admin>) -> Response {
    success(admin, "Current administrator")
}

/// Gate for admin routes: resolves the session to an `Admin` and stores it
/// in request extensions.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(req.headers())
        .ok_or_else(|| AppError::Unauthorized("Please log in to access this page.".to_string()))?;
    let claims = auth::validate_token(&state.config.secret_key, &token)?;
    let admin = auth::session_admin(&state.pool, &claims).await?;

    req.extensions_mut().insert(admin);
    Ok(next.run(req).await)
}
