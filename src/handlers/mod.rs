// HTTP handlers and the routers that mount them.
//
// Handlers validate the request, call into `models`, and wrap the result in
// `ApiResponse`. Guards are attached per router with `route_layer` so they
// only run for matched routes and can read path parameters.
use axum::{
    http::{HeaderValue, StatusCode},
    middleware::from_fn,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::config;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{authenticate_jwt, ensure_admin, ensure_correct_user_or_admin, ensure_logged_in};

pub mod auth;
pub mod companies;
pub mod jobs;
pub mod users;

/// The full application router.
pub fn app() -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(company_routes())
        .merge(job_routes())
        .merge(user_routes())
        .fallback(not_found)
        .layer(from_fn(authenticate_jwt))
        .layer(cors_layer());

    if config().api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn auth_routes() -> Router {
    let public = Router::new()
        .route("/auth/token", post(auth::token))
        .route("/auth/register", post(auth::register));

    let logged_in = Router::new()
        .route("/auth/whoami", get(auth::whoami))
        .route_layer(from_fn(ensure_logged_in));

    public.merge(logged_in)
}

fn company_routes() -> Router {
    let public = Router::new()
        .route("/companies", get(companies::list))
        .route("/companies/:handle", get(companies::get));

    let admin = Router::new()
        .route("/companies", post(companies::create))
        .route("/companies/:handle", axum::routing::patch(companies::update).delete(companies::remove))
        .route_layer(from_fn(ensure_admin));

    public.merge(admin)
}

fn job_routes() -> Router {
    let public = Router::new()
        .route("/jobs", get(jobs::list))
        .route("/jobs/:id", get(jobs::get));

    let admin = Router::new()
        .route("/jobs", post(jobs::create))
        .route("/jobs/:id", axum::routing::patch(jobs::update).delete(jobs::remove))
        .route_layer(from_fn(ensure_admin));

    public.merge(admin)
}

fn user_routes() -> Router {
    let admin = Router::new()
        .route("/users", get(users::list).post(users::create))
        .route_layer(from_fn(ensure_admin));

    let self_or_admin = Router::new()
        .route(
            "/users/:username",
            get(users::get).patch(users::update).delete(users::remove),
        )
        .route("/users/:username/jobs/:id", post(users::apply))
        .route_layer(from_fn(ensure_correct_user_or_admin));

    admin.merge(self_or_admin)
}

fn cors_layer() -> CorsLayer {
    let origins = &config().security.cors_origins;
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}

/// GET /health - Liveness plus a database round trip
async fn health() -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
