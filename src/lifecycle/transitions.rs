//! Role-scoped status transition tables.
//!
//! Vendors and workers hold different mutation rights over the same status
//! enum, so each role gets its own explicit table rather than a shared
//! machine. A pair absent from the relevant table is an invalid transition.

use crate::domain::booking::BookingStatus;

/// Which role is driving a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Vendor,
    Worker,
}

/// Statuses with no outbound transitions in either table.
pub const TERMINAL_STATUSES: &[BookingStatus] = &[
    BookingStatus::Completed,
    BookingStatus::Rejected,
    BookingStatus::Cancelled,
];

/// Statuses a booking may hold for a vendor to accept it.
pub const ACCEPTABLE_STATUSES: &[BookingStatus] =
    &[BookingStatus::Requested, BookingStatus::Searching];

/// Statuses from which a worker may start the journey to the site.
pub const START_JOB_STATUSES: &[BookingStatus] =
    &[BookingStatus::Assigned, BookingStatus::Confirmed];

/// Statuses from which a worker may mark the work done.
pub const COMPLETE_JOB_STATUSES: &[BookingStatus] =
    &[BookingStatus::Visited, BookingStatus::InProgress];

/// Statuses counted as an active job on the worker dashboard.
pub const ACTIVE_JOB_STATUSES: &[BookingStatus] = &[
    BookingStatus::Assigned,
    BookingStatus::Visited,
    BookingStatus::InProgress,
    BookingStatus::Confirmed,
];

/// Statuses counted as completed (and earning) on the worker dashboard.
pub const SETTLED_JOB_STATUSES: &[BookingStatus] =
    &[BookingStatus::Completed, BookingStatus::WorkDone];

/// Allowed target statuses for `role` from `from`. Empty for any status the
/// role cannot move the booking out of, terminal states included.
pub fn allowed_targets(role: Role, from: BookingStatus) -> &'static [BookingStatus] {
    use BookingStatus::*;

    match role {
        Role::Vendor => match from {
            Pending => &[Confirmed, Rejected, Cancelled],
            AwaitingPayment => &[Confirmed, Cancelled, Rejected],
            Confirmed => &[Assigned, InProgress, Cancelled],
            Assigned => &[Visited, InProgress, Cancelled],
            Visited => &[WorkDone, InProgress, Cancelled],
            InProgress => &[WorkDone, Completed, Cancelled],
            WorkDone => &[Completed, Cancelled],
            _ => &[],
        },
        Role::Worker => match from {
            Assigned => &[Visited, InProgress],
            // Legacy path: bookings confirmed before a worker was assigned.
            Confirmed => &[Assigned, InProgress],
            Visited => &[WorkDone, Completed],
            InProgress => &[WorkDone, Completed],
            WorkDone => &[Completed],
            _ => &[],
        },
    }
}

pub fn is_allowed(role: Role, from: BookingStatus, to: BookingStatus) -> bool {
    allowed_targets(role, from).contains(&to)
}
