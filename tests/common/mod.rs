//! Shared fixtures for the integration tests: a manual clock, recording and
//! failing notifiers, and entity builders over the in-memory store.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use homecrew_backend::domain::booking::{Booking, BookingStatus};
use homecrew_backend::domain::notifications::{BookingNotification, NotifyTarget};
use homecrew_backend::domain::worker::Worker;
use homecrew_backend::lifecycle::BookingLifecycle;
use homecrew_backend::services::{Clock, Notifier};
use homecrew_backend::store::MemoryStore;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
}

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance_secs(&self, seconds: i64) {
        let mut now = self.now.lock();
        *now = *now + Duration::seconds(seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(NotifyTarget, BookingNotification)>>,
}

impl RecordingNotifier {
    pub fn kinds(&self) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .map(|(_, n)| n.kind.to_string())
            .collect()
    }

    pub fn targets(&self) -> Vec<NotifyTarget> {
        self.sent.lock().iter().map(|(t, _)| *t).collect()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        target: NotifyTarget,
        notification: BookingNotification,
    ) -> anyhow::Result<()> {
        self.sent.lock().push((target, notification));
        Ok(())
    }
}

/// Always fails; transitions must still commit.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(
        &self,
        _target: NotifyTarget,
        _notification: BookingNotification,
    ) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("notification channel down"))
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<ManualClock>,
    pub engine: BookingLifecycle,
}

pub fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let clock = Arc::new(ManualClock::new(t0()));
    let engine = BookingLifecycle::new(
        store.clone(),
        store.clone(),
        notifier.clone(),
        clock.clone(),
    );
    Harness {
        store,
        notifier,
        clock,
        engine,
    }
}

pub fn failing_harness() -> (BookingLifecycle, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let engine = BookingLifecycle::new(
        store.clone(),
        store.clone(),
        Arc::new(FailingNotifier),
        Arc::new(ManualClock::new(t0())),
    );
    (engine, store)
}

pub fn booking(status: BookingStatus) -> Booking {
    Booking {
        id: Uuid::new_v4(),
        booking_number: format!("BK-{}", &Uuid::new_v4().simple().to_string()[..8]),
        status,
        user_id: Uuid::new_v4(),
        vendor_id: None,
        worker_id: None,
        service_id: Uuid::new_v4(),
        category_id: Uuid::new_v4(),
        scheduled_date: t0() + Duration::days(2),
        final_amount: None,
        rating: None,
        vendor_notes: None,
        worker_notes: None,
        worker_payment_status: None,
        final_settlement_status: None,
        cancelled_by: None,
        cancellation_reason: None,
        accepted_at: None,
        assigned_at: None,
        started_at: None,
        completed_at: None,
        cancelled_at: None,
        created_at: t0(),
        updated_at: t0(),
    }
}

pub fn vendor_booking(status: BookingStatus, vendor_id: Uuid) -> Booking {
    Booking {
        vendor_id: Some(vendor_id),
        ..booking(status)
    }
}

pub fn worker_booking(status: BookingStatus, vendor_id: Uuid, worker_id: Uuid) -> Booking {
    Booking {
        vendor_id: Some(vendor_id),
        worker_id: Some(worker_id),
        ..booking(status)
    }
}

pub fn worker(vendor_id: Uuid) -> Worker {
    Worker {
        id: Uuid::new_v4(),
        vendor_id,
        name: "Asha Verma".to_string(),
        phone: Some("+911234567890".to_string()),
        status: "active".to_string(),
        rating: None,
        created_at: t0(),
        updated_at: t0(),
    }
}
