//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    handler::Handler,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{auth_middleware, require_admin};
use crate::presentation::websocket::ws_handler;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes(state.clone()))
        // Realtime relay endpoint; the token is presented in-band (Identify)
        .route("/ws", get(ws_handler))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(track_metrics))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// Record count and latency for every request, labelled by route template
/// so path parameters do not explode metric cardinality.
async fn track_metrics(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_string());

    let start = Instant::now();
    let response = next.run(request).await;

    metrics::record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

/// API routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes(state.clone()))
        .nest("/friends", friend_routes(state.clone()))
        .nest("/rooms", room_routes(state.clone()))
        .nest("/admin", admin_routes(state))
}

/// Authentication routes. Logout and the profile endpoint require a valid
/// access token; everything else is reachable without one.
fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh_token))
        .route(
            "/password/request-reset",
            post(handlers::auth::request_password_reset),
        )
        .route(
            "/password/verify-reset-code",
            post(handlers::auth::verify_reset_code),
        )
        .route("/password/reset", post(handlers::auth::reset_password))
        .merge(protected)
}

/// Friend routes (all protected). The `{id}` segment is a username for
/// sending a request and a friendship row id for responding to one.
fn friend_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::friend::list_friends))
        .route("/requests", get(handlers::friend::list_requests))
        .route(
            "/requests/{id}",
            post(handlers::friend::send_request).put(handlers::friend::respond_request),
        )
        .route("/{friend_id}", delete(handlers::friend::remove_friend))
        .route("/block/{user_id}", post(handlers::friend::block_user))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Room routes. The lobby listing is public; everything else needs a token,
/// including creation on the same path.
fn room_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/{room_id}", delete(handlers::room::delete_room))
        .route("/{room_id}/join", post(handlers::room::join_room))
        .route("/{room_id}/leave", post(handlers::room::leave_room))
        .route("/{room_id}/members", get(handlers::room::list_members))
        .route(
            "/{room_id}/members/{user_id}",
            delete(handlers::room::kick_member),
        )
        .route(
            "/{room_id}/join-requests",
            get(handlers::room::list_join_requests),
        )
        .route(
            "/{room_id}/join-requests/{request_id}",
            put(handlers::room::respond_join_request),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route(
            "/",
            get(handlers::room::list_rooms).post(
                handlers::room::create_room
                    .layer(middleware::from_fn_with_state(state, auth_middleware)),
            ),
        )
        .merge(protected)
}

/// Admin console routes. The auth layer runs first and populates the
/// user extension the admin guard checks.
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::admin::list_users))
        .route(
            "/users/{user_id}/status",
            put(handlers::admin::update_user_status),
        )
        .route(
            "/users/{user_id}/role",
            put(handlers::admin::update_user_role),
        )
        .route(
            "/users/{user_id}/password",
            put(handlers::admin::update_user_password),
        )
        .route("/users/{user_id}", delete(handlers::admin::delete_user))
        .route("/rooms", get(handlers::admin::list_rooms))
        .route(
            "/rooms/{room_id}",
            put(handlers::admin::update_room).delete(handlers::admin::delete_room),
        )
        .route(
            "/rooms/{room_id}/members/{user_id}",
            delete(handlers::room::kick_member),
        )
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
