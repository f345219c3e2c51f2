//! Worker dashboard routes

use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::api::response::DataResponse;
use crate::app::AppState;
use crate::auth::RequireWorker;
use crate::error::ApiError;

/// GET /worker/dashboard/stats
///
/// Earnings, job counts, average rating and recent jobs for the worker.
pub async fn get_stats(
    auth: RequireWorker,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state.lifecycle.worker_dashboard(auth.worker_id).await?;
    Ok(Json(DataResponse::new(stats)))
}
