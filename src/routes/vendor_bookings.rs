//! Vendor booking routes
//!
//! The vendor side of the booking lifecycle: the request feed, acceptance
//! and rejection, worker assignment, status updates and notes.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::pagination::PaginationParams;
use crate::api::response::DataResponse;
use crate::api::Paginated;
use crate::app::AppState;
use crate::auth::RequireVendor;
use crate::domain::booking::{
    AssignWorkerInput, BookingStatus, NotesInput, RejectBookingInput, UpdateBookingStatusInput,
};
use crate::error::ApiError;
use crate::store::VendorBookingFilter;

#[derive(Debug, Deserialize, Default)]
pub struct VendorBookingQueryParams {
    pub status: Option<BookingStatus>,
    // Older clients send camelCase date params.
    #[serde(alias = "startDate")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(alias = "endDate")]
    pub end_date: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl VendorBookingQueryParams {
    fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            limit: self.limit,
        }
    }

    fn filter(&self) -> VendorBookingFilter {
        VendorBookingFilter {
            status: self.status,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// GET /vendor/bookings
///
/// List the vendor's bookings plus the unassigned request feed.
pub async fn list_bookings(
    auth: RequireVendor,
    State(state): State<Arc<AppState>>,
    Query(query): Query<VendorBookingQueryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let pagination = query.pagination();
    let page = state
        .lifecycle
        .vendor_bookings(auth.vendor_id, &query.filter(), &pagination.to_page_request())
        .await?;

    Ok(Paginated::new(page.items, &pagination, page.total))
}

/// GET /vendor/bookings/:id
pub async fn get_booking(
    auth: RequireVendor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = state.lifecycle.vendor_booking(id, auth.vendor_id).await?;
    Ok(Json(DataResponse::new(booking)))
}

/// POST /vendor/bookings/:id/accept
pub async fn accept_booking(
    auth: RequireVendor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(vendor_id = %auth.vendor_id, booking_id = %id, "Accepting booking");

    let booking = state.lifecycle.accept_booking(id, auth.vendor_id).await?;
    Ok(Json(DataResponse::new(booking)))
}

/// POST /vendor/bookings/:id/reject
pub async fn reject_booking(
    auth: RequireVendor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(input): Json<RejectBookingInput>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(vendor_id = %auth.vendor_id, booking_id = %id, "Rejecting booking");

    let booking = state
        .lifecycle
        .reject_booking(id, auth.vendor_id, input)
        .await?;
    Ok(Json(DataResponse::new(booking)))
}

/// POST /vendor/bookings/:id/assign-worker
pub async fn assign_worker(
    auth: RequireVendor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(input): Json<AssignWorkerInput>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(
        vendor_id = %auth.vendor_id,
        booking_id = %id,
        worker_id = %input.worker_id,
        "Assigning worker"
    );

    let booking = state
        .lifecycle
        .assign_worker(id, auth.vendor_id, input)
        .await?;
    Ok(Json(DataResponse::new(booking)))
}

/// PATCH /vendor/bookings/:id/status
pub async fn update_status(
    auth: RequireVendor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateBookingStatusInput>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(
        vendor_id = %auth.vendor_id,
        booking_id = %id,
        status = ?input.status,
        "Updating booking status"
    );

    let booking = state
        .lifecycle
        .update_booking_status(id, auth.vendor_id, input)
        .await?;
    Ok(Json(DataResponse::new(booking)))
}

/// POST /vendor/bookings/:id/notes
pub async fn add_notes(
    auth: RequireVendor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(input): Json<NotesInput>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = state
        .lifecycle
        .add_vendor_notes(id, auth.vendor_id, input)
        .await?;
    Ok(Json(DataResponse::new(booking)))
}
