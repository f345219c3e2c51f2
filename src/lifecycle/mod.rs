//! Booking lifecycle engine: transition tables, guard conditions and the
//! timestamp/field-update policy, behind role-scoped operations.

pub mod engine;
pub mod error;
pub mod transitions;

pub use engine::BookingLifecycle;
pub use error::{LifecycleError, LifecycleResult};
pub use transitions::Role;
