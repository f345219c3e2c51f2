//! Worker domain types
//!
//! Workers belong to exactly one vendor and perform the on-site work for
//! that vendor's bookings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status values a worker may hold while still being assignable.
///
/// Production data carries legacy mixed-case tokens alongside the current
/// lowercase one, so assignment checks against the full set.
pub const ACTIVE_WORKER_STATUSES: &[&str] = &["active", "ONLINE", "ACTIVE"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub status: String,
    pub rating: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Worker {
    pub fn is_active(&self) -> bool {
        ACTIVE_WORKER_STATUSES.contains(&self.status.as_str())
    }
}
