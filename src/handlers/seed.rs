// Seeding handlers

use axum::{extract::State, response::Json};
use std::sync::Arc;
use tracing::{error, info};

use crate::{error::AppError, services::SeedReport, AppState};

// ANY / - Run a full seeding pass and report every outcome
pub async fn seed(State(state): State<Arc<AppState>>) -> Result<Json<SeedReport>, AppError> {
    let service = Arc::clone(&state.seed_service);

    // Spawned so a dropped connection can't cancel a run halfway through a phase
    let report = tokio::spawn(async move { service.run().await })
        .await
        .map_err(|e| {
            error!("Seeding task failed: {}", e);
            AppError::Internal(format!("Seeding task failed: {}", e))
        })??;

    info!(entries = report.results.len(), "Seeding run finished");
    Ok(Json(report))
}

// GET /health - Liveness probe, never touches the backend
pub async fn health() -> &'static str {
    "ok"
}
