pub mod health;
pub mod vendor_bookings;
pub mod worker_dashboard;
pub mod worker_jobs;

use axum::{routing::get, routing::patch, routing::post, Router};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        // Vendor bookings
        .route("/vendor/bookings", get(vendor_bookings::list_bookings))
        .route("/vendor/bookings/:id", get(vendor_bookings::get_booking))
        .route(
            "/vendor/bookings/:id/accept",
            post(vendor_bookings::accept_booking),
        )
        .route(
            "/vendor/bookings/:id/reject",
            post(vendor_bookings::reject_booking),
        )
        .route(
            "/vendor/bookings/:id/assign-worker",
            post(vendor_bookings::assign_worker),
        )
        .route(
            "/vendor/bookings/:id/status",
            patch(vendor_bookings::update_status),
        )
        .route(
            "/vendor/bookings/:id/notes",
            post(vendor_bookings::add_notes),
        )
        // Worker jobs
        .route("/worker/jobs", get(worker_jobs::list_jobs))
        .route("/worker/jobs/:id", get(worker_jobs::get_job))
        .route("/worker/jobs/:id/status", patch(worker_jobs::update_status))
        .route("/worker/jobs/:id/start", post(worker_jobs::start_job))
        .route("/worker/jobs/:id/complete", post(worker_jobs::complete_job))
        .route("/worker/jobs/:id/notes", post(worker_jobs::add_notes))
        // Worker dashboard
        .route("/worker/dashboard/stats", get(worker_dashboard::get_stats))
}
