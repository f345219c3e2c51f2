//! Persistence traits for bookings and workers.
//!
//! The lifecycle engine only sees these traits. Mutations that carry a status
//! transition go through [`BookingStore::update`], a conditional write guarded
//! on the pre-read `(status, vendor_id)` pair so a losing racer never silently
//! overwrites a winning transition. Side-channel writes (notes, settlement
//! flags) use narrow setters that touch nothing else.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::worker::Worker;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Pre-read fields a conditional write is validated against at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteGuard {
    pub status: BookingStatus,
    pub vendor_id: Option<Uuid>,
}

impl WriteGuard {
    pub fn of(booking: &Booking) -> Self {
        Self {
            status: booking.status,
            vendor_id: booking.vendor_id,
        }
    }
}

/// One page of a filtered listing.
#[derive(Debug, Clone)]
pub struct BookingPage {
    pub items: Vec<Booking>,
    pub total: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    /// 1-indexed page number.
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        (self.page.max(1) as u64 - 1) * self.limit as u64
    }
}

#[derive(Debug, Clone, Default)]
pub struct VendorBookingFilter {
    pub status: Option<BookingStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct WorkerJobFilter {
    pub status: Option<BookingStatus>,
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError>;

    /// Unscoped lookup; used where any vendor may attempt an operation.
    async fn by_id(&self, id: Uuid) -> Result<Option<Booking>, StoreError>;

    /// Strict ownership scope: the booking's `vendor_id` must match.
    async fn owned_by_vendor(&self, id: Uuid, vendor_id: Uuid)
        -> Result<Option<Booking>, StoreError>;

    /// Vendor detail scope: owned by the vendor, or still unassigned in
    /// REQUESTED/SEARCHING.
    async fn visible_to_vendor(
        &self,
        id: Uuid,
        vendor_id: Uuid,
    ) -> Result<Option<Booking>, StoreError>;

    /// Strict ownership scope: the booking's `worker_id` must match.
    async fn owned_by_worker(&self, id: Uuid, worker_id: Uuid)
        -> Result<Option<Booking>, StoreError>;

    /// Conditional full-record write. Persists `booking` only while the stored
    /// record still matches `guard`; returns `false` when it no longer does.
    async fn update(&self, booking: &Booking, guard: &WriteGuard) -> Result<bool, StoreError>;

    /// Overwrite the vendor notes on a vendor-owned booking. Returns the
    /// updated record, or `None` when the scoped lookup misses.
    async fn set_vendor_notes(
        &self,
        id: Uuid,
        vendor_id: Uuid,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Booking>, StoreError>;

    /// Overwrite the worker notes on a worker-owned booking.
    async fn set_worker_notes(
        &self,
        id: Uuid,
        worker_id: Uuid,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Booking>, StoreError>;

    /// Set the settlement side channels without touching the status machine.
    async fn set_settlement(
        &self,
        id: Uuid,
        vendor_id: Uuid,
        worker_payment_status: Option<&str>,
        final_settlement_status: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<Booking>, StoreError>;

    /// Vendor list view: bookings assigned to the vendor (excluding
    /// AWAITING_PAYMENT) plus unassigned REQUESTED/SEARCHING ones, newest
    /// first.
    async fn list_for_vendor(
        &self,
        vendor_id: Uuid,
        filter: &VendorBookingFilter,
        page: &PageRequest,
    ) -> Result<BookingPage, StoreError>;

    /// Worker list view: strictly `worker_id` matches, by scheduled date.
    async fn list_for_worker(
        &self,
        worker_id: Uuid,
        filter: &WorkerJobFilter,
        page: &PageRequest,
    ) -> Result<BookingPage, StoreError>;

    /// Every booking belonging to a worker, newest first.
    async fn all_for_worker(&self, worker_id: Uuid) -> Result<Vec<Booking>, StoreError>;
}

#[async_trait]
pub trait WorkerStore: Send + Sync {
    async fn insert_worker(&self, worker: &Worker) -> Result<(), StoreError>;

    async fn worker_by_id(&self, id: Uuid) -> Result<Option<Worker>, StoreError>;

    /// Scoped lookup: the worker must belong to the vendor.
    async fn worker_for_vendor(
        &self,
        id: Uuid,
        vendor_id: Uuid,
    ) -> Result<Option<Worker>, StoreError>;
}
