use axum::http::header::CACHE_CONTROL;
use axum::http::HeaderValue;
use axum::routing::{delete, get, post};
use axum::{middleware, Router};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{api, auth, health_check, profiles, tickets};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let admin = Router::new()
        .route("/auth/me", get(auth::me))
        .route(
            "/profiles",
            get(profiles::list_profiles).post(profiles::create_profile),
        )
        .route(
            "/profiles/:id",
            get(profiles::get_profile)
                .put(profiles::update_profile)
                .delete(profiles::delete_profile),
        )
        .route("/profiles/:id/tickets", post(tickets::create_ticket))
        .route("/tickets/:id", delete(tickets::delete_ticket))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    let public = Router::new()
        .route("/health", get(health_check))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/api/login", post(api::register_login))
        .route("/api/ticket/:lock_code", get(api::get_ticket_info));

    let production = state.config.production;
    let cors = create_cors_layer(&state.config.cors_allowed_origins);

    public
        .merge(admin)
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(create_security_headers_layer(production))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
