//! Notification domain types
//!
//! In-app alerts fanned out to users, vendors and workers as bookings move
//! through the lifecycle.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::booking::Booking;

/// Notification kind, serialized with the wire tokens clients filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    BookingAccepted,
    BookingRejected,
    WorkerAssigned,
    BookingCreated,
    BookingCompleted,
    WorkerStarted,
    WorkerCompleted,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::BookingAccepted => "booking_accepted",
            NotificationKind::BookingRejected => "booking_rejected",
            NotificationKind::WorkerAssigned => "worker_assigned",
            NotificationKind::BookingCreated => "booking_created",
            NotificationKind::BookingCompleted => "booking_completed",
            NotificationKind::WorkerStarted => "worker_started",
            NotificationKind::WorkerCompleted => "worker_completed",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recipient of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyTarget {
    User(Uuid),
    Vendor(Uuid),
    Worker(Uuid),
}

impl NotifyTarget {
    /// (recipient type tag, recipient id) for persistence.
    pub fn recipient(self) -> (&'static str, Uuid) {
        match self {
            NotifyTarget::User(id) => ("user", id),
            NotifyTarget::Vendor(id) => ("vendor", id),
            NotifyTarget::Worker(id) => ("worker", id),
        }
    }
}

/// A notification about a booking, ready for dispatch.
#[derive(Debug, Clone)]
pub struct BookingNotification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub booking_id: Uuid,
}

impl BookingNotification {
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        booking: &Booking,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            booking_id: booking.id,
        }
    }
}
