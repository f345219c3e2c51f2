//! Booking domain types
//!
//! The central marketplace entity: a service request moving through its
//! lifecycle from creation to settlement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Booking lifecycle status.
///
/// The serialized tokens are a compatibility surface: external clients match
/// on the exact uppercase strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Requested,
    Searching,
    AwaitingPayment,
    Pending,
    Confirmed,
    Assigned,
    Visited,
    InProgress,
    WorkDone,
    Completed,
    Rejected,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 12] = [
        BookingStatus::Requested,
        BookingStatus::Searching,
        BookingStatus::AwaitingPayment,
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Assigned,
        BookingStatus::Visited,
        BookingStatus::InProgress,
        BookingStatus::WorkDone,
        BookingStatus::Completed,
        BookingStatus::Rejected,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Requested => "REQUESTED",
            BookingStatus::Searching => "SEARCHING",
            BookingStatus::AwaitingPayment => "AWAITING_PAYMENT",
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Assigned => "ASSIGNED",
            BookingStatus::Visited => "VISITED",
            BookingStatus::InProgress => "IN_PROGRESS",
            BookingStatus::WorkDone => "WORK_DONE",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Rejected => "REJECTED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REQUESTED" => Ok(BookingStatus::Requested),
            "SEARCHING" => Ok(BookingStatus::Searching),
            "AWAITING_PAYMENT" => Ok(BookingStatus::AwaitingPayment),
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "ASSIGNED" => Ok(BookingStatus::Assigned),
            "VISITED" => Ok(BookingStatus::Visited),
            "IN_PROGRESS" => Ok(BookingStatus::InProgress),
            "WORK_DONE" => Ok(BookingStatus::WorkDone),
            "COMPLETED" => Ok(BookingStatus::Completed),
            "REJECTED" => Ok(BookingStatus::Rejected),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

/// Which actor cancelled or rejected a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelActor {
    User,
    Vendor,
    Admin,
}

impl CancelActor {
    pub fn as_str(self) -> &'static str {
        match self {
            CancelActor::User => "user",
            CancelActor::Vendor => "vendor",
            CancelActor::Admin => "admin",
        }
    }
}

impl std::fmt::Display for CancelActor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CancelActor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(CancelActor::User),
            "vendor" => Ok(CancelActor::Vendor),
            "admin" => Ok(CancelActor::Admin),
            other => Err(format!("unknown cancel actor: {other}")),
        }
    }
}

/// A single service request.
///
/// `vendor_id` stays null until a vendor accepts and is never reassigned
/// afterwards. `worker_id` is set only by the owning vendor. The lifecycle
/// timestamps are each written at most once per stage as the booking
/// advances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub booking_number: String,
    pub status: BookingStatus,
    pub user_id: Uuid,
    pub vendor_id: Option<Uuid>,
    pub worker_id: Option<Uuid>,
    pub service_id: Uuid,
    pub category_id: Uuid,
    pub scheduled_date: DateTime<Utc>,
    pub final_amount: Option<f64>,
    pub rating: Option<f64>,
    pub vendor_notes: Option<String>,
    pub worker_notes: Option<String>,
    pub worker_payment_status: Option<String>,
    pub final_settlement_status: Option<String>,
    pub cancelled_by: Option<CancelActor>,
    pub cancellation_reason: Option<String>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reject booking input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RejectBookingInput {
    pub reason: Option<String>,
}

/// Assign worker input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignWorkerInput {
    pub worker_id: Uuid,
}

/// Vendor status update input.
///
/// `status` may be omitted to update only the settlement side channels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBookingStatusInput {
    pub status: Option<BookingStatus>,
    pub worker_payment_status: Option<String>,
    pub final_settlement_status: Option<String>,
}

/// Worker status update input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateJobStatusInput {
    pub status: BookingStatus,
}

/// Notes input, shared by the vendor and worker notes endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesInput {
    pub notes: String,
}

/// Worker dashboard aggregation
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_earnings: f64,
    pub active_jobs: u64,
    pub completed_jobs: u64,
    pub rating: f64,
    pub recent_jobs: Vec<Booking>,
}
