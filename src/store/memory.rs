//! In-memory store.
//!
//! Backs the test suite and local experimentation. Guarded writes hold the
//! write lock across the compare and the swap, which gives the same
//! at-most-one-winner behavior as the conditional SQL update.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::worker::Worker;
use crate::store::{
    BookingPage, BookingStore, PageRequest, StoreError, VendorBookingFilter, WorkerJobFilter,
    WorkerStore, WriteGuard,
};

#[derive(Default)]
pub struct MemoryStore {
    bookings: RwLock<HashMap<Uuid, Booking>>,
    workers: RwLock<HashMap<Uuid, Worker>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn vendor_view(booking: &Booking, vendor_id: Uuid) -> bool {
        match booking.vendor_id {
            Some(owner) => owner == vendor_id && booking.status != BookingStatus::AwaitingPayment,
            None => matches!(
                booking.status,
                BookingStatus::Requested | BookingStatus::Searching
            ),
        }
    }

    fn paginate(mut items: Vec<Booking>, page: &PageRequest) -> BookingPage {
        let total = items.len() as u64;
        let offset = page.offset().min(total) as usize;
        let mut items = items.split_off(offset);
        items.truncate(page.limit as usize);
        BookingPage { items, total }
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError> {
        self.bookings.write().insert(booking.id, booking.clone());
        Ok(())
    }

    async fn by_id(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        Ok(self.bookings.read().get(&id).cloned())
    }

    async fn owned_by_vendor(
        &self,
        id: Uuid,
        vendor_id: Uuid,
    ) -> Result<Option<Booking>, StoreError> {
        Ok(self
            .bookings
            .read()
            .get(&id)
            .filter(|b| b.vendor_id == Some(vendor_id))
            .cloned())
    }

    async fn visible_to_vendor(
        &self,
        id: Uuid,
        vendor_id: Uuid,
    ) -> Result<Option<Booking>, StoreError> {
        Ok(self
            .bookings
            .read()
            .get(&id)
            .filter(|b| {
                b.vendor_id == Some(vendor_id)
                    || (b.vendor_id.is_none()
                        && matches!(
                            b.status,
                            BookingStatus::Requested | BookingStatus::Searching
                        ))
            })
            .cloned())
    }

    async fn owned_by_worker(
        &self,
        id: Uuid,
        worker_id: Uuid,
    ) -> Result<Option<Booking>, StoreError> {
        Ok(self
            .bookings
            .read()
            .get(&id)
            .filter(|b| b.worker_id == Some(worker_id))
            .cloned())
    }

    async fn update(&self, booking: &Booking, guard: &WriteGuard) -> Result<bool, StoreError> {
        let mut bookings = self.bookings.write();
        match bookings.get(&booking.id) {
            Some(current)
                if current.status == guard.status && current.vendor_id == guard.vendor_id =>
            {
                bookings.insert(booking.id, booking.clone());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_vendor_notes(
        &self,
        id: Uuid,
        vendor_id: Uuid,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Booking>, StoreError> {
        let mut bookings = self.bookings.write();
        match bookings.get_mut(&id).filter(|b| b.vendor_id == Some(vendor_id)) {
            Some(booking) => {
                booking.vendor_notes = Some(notes.to_string());
                booking.updated_at = now;
                Ok(Some(booking.clone()))
            }
            None => Ok(None),
        }
    }

    async fn set_worker_notes(
        &self,
        id: Uuid,
        worker_id: Uuid,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Booking>, StoreError> {
        let mut bookings = self.bookings.write();
        match bookings.get_mut(&id).filter(|b| b.worker_id == Some(worker_id)) {
            Some(booking) => {
                booking.worker_notes = Some(notes.to_string());
                booking.updated_at = now;
                Ok(Some(booking.clone()))
            }
            None => Ok(None),
        }
    }

    async fn set_settlement(
        &self,
        id: Uuid,
        vendor_id: Uuid,
        worker_payment_status: Option<&str>,
        final_settlement_status: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<Booking>, StoreError> {
        let mut bookings = self.bookings.write();
        match bookings.get_mut(&id).filter(|b| b.vendor_id == Some(vendor_id)) {
            Some(booking) => {
                if let Some(wps) = worker_payment_status {
                    booking.worker_payment_status = Some(wps.to_string());
                }
                if let Some(fss) = final_settlement_status {
                    booking.final_settlement_status = Some(fss.to_string());
                }
                booking.updated_at = now;
                Ok(Some(booking.clone()))
            }
            None => Ok(None),
        }
    }

    async fn list_for_vendor(
        &self,
        vendor_id: Uuid,
        filter: &VendorBookingFilter,
        page: &PageRequest,
    ) -> Result<BookingPage, StoreError> {
        let mut items: Vec<Booking> = self
            .bookings
            .read()
            .values()
            .filter(|b| Self::vendor_view(b, vendor_id))
            .filter(|b| filter.status.map_or(true, |s| b.status == s))
            .filter(|b| filter.start_date.map_or(true, |d| b.scheduled_date >= d))
            .filter(|b| filter.end_date.map_or(true, |d| b.scheduled_date <= d))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(Self::paginate(items, page))
    }

    async fn list_for_worker(
        &self,
        worker_id: Uuid,
        filter: &WorkerJobFilter,
        page: &PageRequest,
    ) -> Result<BookingPage, StoreError> {
        let mut items: Vec<Booking> = self
            .bookings
            .read()
            .values()
            .filter(|b| b.worker_id == Some(worker_id))
            .filter(|b| filter.status.map_or(true, |s| b.status == s))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.scheduled_date
                .cmp(&b.scheduled_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(Self::paginate(items, page))
    }

    async fn all_for_worker(&self, worker_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let mut items: Vec<Booking> = self
            .bookings
            .read()
            .values()
            .filter(|b| b.worker_id == Some(worker_id))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }
}

#[async_trait]
impl WorkerStore for MemoryStore {
    async fn insert_worker(&self, worker: &Worker) -> Result<(), StoreError> {
        self.workers.write().insert(worker.id, worker.clone());
        Ok(())
    }

    async fn worker_by_id(&self, id: Uuid) -> Result<Option<Worker>, StoreError> {
        Ok(self.workers.read().get(&id).cloned())
    }

    async fn worker_for_vendor(
        &self,
        id: Uuid,
        vendor_id: Uuid,
    ) -> Result<Option<Worker>, StoreError> {
        Ok(self
            .workers
            .read()
            .get(&id)
            .filter(|w| w.vendor_id == vendor_id)
            .cloned())
    }
}
