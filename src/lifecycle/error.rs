//! Typed failures for lifecycle operations.

use thiserror::Error;

use crate::domain::booking::BookingStatus;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Record absent, or not owned by the caller. Ownership-scoped lookups
    /// deliberately conflate the two so existence is never leaked.
    #[error("{0}")]
    NotFound(&'static str),

    /// The operation's precondition set does not admit the current status.
    #[error("Cannot {action} with status: {current}")]
    InvalidState {
        action: &'static str,
        current: BookingStatus,
    },

    /// The worker exists but is not assignable.
    #[error("Worker is not active (Status: {status})")]
    WorkerInactive { status: String },

    /// No transition-table entry for the (current, requested) pair.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    /// Another vendor already claimed the booking.
    #[error("This booking has already been accepted by another vendor")]
    AlreadyAssigned,

    /// Malformed or missing payload fields.
    #[error("Validation failed: {0}")]
    Validation(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
