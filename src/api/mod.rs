mod handlers;

use std::sync::{Arc, Mutex};

use axum::{
    http::HeaderValue,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::db::Database;
use crate::models::Quarter;
use crate::planner::Planner;

/// Shared state for all handlers.
///
/// The server hosts a single planner: one user, one plan, no persistence
/// across restarts.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub planner: Arc<Mutex<Planner>>,
    pub default_quarter: Quarter,
}

impl AppState {
    pub fn new(db: Database, default_quarter: Quarter) -> Self {
        Self {
            db,
            planner: Arc::new(Mutex::new(Planner::new())),
            default_quarter,
        }
    }
}

pub fn create_router(db: Database) -> Router {
    create_router_with_config(db, &AppConfig::default())
}

pub fn create_router_with_config(db: Database, config: &AppConfig) -> Router {
    let state = AppState::new(db, config.default_quarter);

    let api = Router::new()
        // Courses
        .route("/course/query", get(handlers::query_courses))
        .route(
            "/course/{id}",
            get(handlers::get_course).fallback(handlers::method_not_allowed),
        )
        .route("/catalog", get(handlers::get_catalog))
        .route("/quarters", get(handlers::list_quarters))
        // Plan
        .route("/plan", get(handlers::get_plan))
        .route("/plan/full", get(handlers::get_full_plan))
        .route("/plan/year", put(handlers::select_year))
        .route("/plan/{term}", post(handlers::drop_course))
        .route("/plan/{term}/{course_id}", delete(handlers::remove_course))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(config)),
        )
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    match &config.cors_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| match o.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin: {}", o);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::permissive(),
    }
}
