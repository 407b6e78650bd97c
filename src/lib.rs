pub mod backend;
pub mod config;
pub mod cors;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod services;

use axum::{
    middleware,
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use backend::Backend;
use config::fixtures::FixtureSet;
use services::SeedService;

// Application state
pub struct AppState {
    pub seed_service: Arc<SeedService>,
}

impl AppState {
    pub fn new(backend: Arc<dyn Backend>, fixtures: FixtureSet) -> Self {
        Self {
            seed_service: Arc::new(SeedService::new(backend, Arc::new(fixtures))),
        }
    }
}

// Public function to create the router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", any(handlers::seed::seed))
        .route("/seed-test-users", any(handlers::seed::seed))
        .route("/health", get(handlers::seed::health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(cors::cors)),
        )
        .with_state(state)
}
