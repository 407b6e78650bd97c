// Common test utilities shared across test files

use axum::{body::Body, response::Response, Router};
use http_body_util::BodyExt;
use nexgo_seeder::{
    backend::{Backend, MemoryBackend},
    config::fixtures::FixtureSet,
    create_router,
    services::SeedService,
    AppState,
};
use std::sync::Arc;

#[allow(dead_code)]
pub const STUDENT: &str = "student@nexgo.test";
#[allow(dead_code)]
pub const VENDOR: &str = "vendor@nexgo.test";
#[allow(dead_code)]
pub const RIDER: &str = "rider@nexgo.test";
#[allow(dead_code)]
pub const ADMIN: &str = "admin@nexgo.test";

#[allow(dead_code)]
pub fn bundled_fixtures() -> FixtureSet {
    FixtureSet::bundled().expect("Bundled fixtures should load")
}

/// Seed service over an in-memory backend with the bundled fixtures
#[allow(dead_code)]
pub fn setup_service(backend: &Arc<MemoryBackend>) -> SeedService {
    setup_service_with(backend, bundled_fixtures())
}

#[allow(dead_code)]
pub fn setup_service_with(backend: &Arc<MemoryBackend>, fixtures: FixtureSet) -> SeedService {
    let backend: Arc<dyn Backend> = backend.clone();
    SeedService::new(backend, Arc::new(fixtures))
}

/// Create a test Axum router backed by the given in-memory backend
#[allow(dead_code)]
pub fn create_test_app(backend: &Arc<MemoryBackend>) -> Router {
    let backend: Arc<dyn Backend> = backend.clone();
    create_router(Arc::new(AppState::new(backend, bundled_fixtures())))
}

#[allow(dead_code)]
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
