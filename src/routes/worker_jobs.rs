//! Worker job routes
//!
//! The worker side of the lifecycle: assigned jobs, journey start, work
//! completion, status updates and notes.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::pagination::PaginationParams;
use crate::api::response::DataResponse;
use crate::api::Paginated;
use crate::app::AppState;
use crate::auth::RequireWorker;
use crate::domain::booking::{BookingStatus, NotesInput, UpdateJobStatusInput};
use crate::error::ApiError;
use crate::store::WorkerJobFilter;

#[derive(Debug, Deserialize, Default)]
pub struct WorkerJobQueryParams {
    pub status: Option<BookingStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// GET /worker/jobs
pub async fn list_jobs(
    auth: RequireWorker,
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkerJobQueryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let pagination = PaginationParams {
        page: query.page,
        limit: query.limit,
    };
    let filter = WorkerJobFilter {
        status: query.status,
    };

    let page = state
        .lifecycle
        .worker_jobs(auth.worker_id, &filter, &pagination.to_page_request())
        .await?;

    Ok(Paginated::new(page.items, &pagination, page.total))
}

/// GET /worker/jobs/:id
pub async fn get_job(
    auth: RequireWorker,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = state.lifecycle.worker_job(id, auth.worker_id).await?;
    Ok(Json(DataResponse::new(booking)))
}

/// PATCH /worker/jobs/:id/status
pub async fn update_status(
    auth: RequireWorker,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateJobStatusInput>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(
        worker_id = %auth.worker_id,
        booking_id = %id,
        status = %input.status,
        "Updating job status"
    );

    let booking = state
        .lifecycle
        .update_job_status(id, auth.worker_id, input)
        .await?;
    Ok(Json(DataResponse::new(booking)))
}

/// POST /worker/jobs/:id/start
pub async fn start_job(
    auth: RequireWorker,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(worker_id = %auth.worker_id, booking_id = %id, "Starting job");

    let booking = state.lifecycle.start_job(id, auth.worker_id).await?;
    Ok(Json(DataResponse::new(booking)))
}

/// POST /worker/jobs/:id/complete
pub async fn complete_job(
    auth: RequireWorker,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(worker_id = %auth.worker_id, booking_id = %id, "Completing job");

    let booking = state.lifecycle.complete_job(id, auth.worker_id).await?;
    Ok(Json(DataResponse::new(booking)))
}

/// POST /worker/jobs/:id/notes
pub async fn add_notes(
    auth: RequireWorker,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(input): Json<NotesInput>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = state
        .lifecycle
        .add_worker_notes(id, auth.worker_id, input)
        .await?;
    Ok(Json(DataResponse::new(booking)))
}
