//! Booking lifecycle operations.
//!
//! Every mutation is one logical read-modify-write of a single booking:
//! scoped load, guard checks, conditional write, then fire-and-forget
//! notifications. When the conditional write loses a race the error is
//! recomputed from the fresh record, so callers see `AlreadyAssigned` or an
//! `InvalidTransition` naming the status that actually won.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::booking::{
    AssignWorkerInput, Booking, BookingStatus, CancelActor, DashboardStats, NotesInput,
    RejectBookingInput, UpdateBookingStatusInput, UpdateJobStatusInput,
};
use crate::domain::notifications::{BookingNotification, NotificationKind, NotifyTarget};
use crate::lifecycle::error::{LifecycleError, LifecycleResult};
use crate::lifecycle::transitions::{self, Role};
use crate::services::clock::Clock;
use crate::services::notifier::Notifier;
use crate::store::{
    BookingPage, BookingStore, PageRequest, VendorBookingFilter, WorkerJobFilter, WorkerStore,
    WriteGuard,
};

pub struct BookingLifecycle {
    bookings: Arc<dyn BookingStore>,
    workers: Arc<dyn WorkerStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl BookingLifecycle {
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        workers: Arc<dyn WorkerStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bookings,
            workers,
            notifier,
            clock,
        }
    }

    // ========================================================================
    // Vendor operations
    // ========================================================================

    /// Claim an unassigned booking for a vendor.
    ///
    /// Any vendor may attempt this, so the lookup is unscoped. Re-accepting a
    /// booking this vendor already holds is a no-op success; a booking held by
    /// anyone else fails `AlreadyAssigned`.
    pub async fn accept_booking(
        &self,
        booking_id: Uuid,
        vendor_id: Uuid,
    ) -> LifecycleResult<Booking> {
        let booking = self
            .bookings
            .by_id(booking_id)
            .await?
            .ok_or(LifecycleError::NotFound("Booking not found"))?;

        if let Some(owner) = booking.vendor_id {
            if owner == vendor_id {
                return Ok(booking);
            }
            return Err(LifecycleError::AlreadyAssigned);
        }

        if !transitions::ACCEPTABLE_STATUSES.contains(&booking.status) {
            return Err(LifecycleError::InvalidState {
                action: "accept booking",
                current: booking.status,
            });
        }

        let guard = WriteGuard::of(&booking);
        let now = self.clock.now();
        let mut updated = booking;
        updated.vendor_id = Some(vendor_id);
        updated.status = BookingStatus::AwaitingPayment;
        updated.accepted_at = Some(now);
        updated.updated_at = now;

        if !self.bookings.update(&updated, &guard).await? {
            return Err(self.accept_conflict(booking_id, vendor_id).await);
        }

        tracing::info!(
            booking_id = %updated.id,
            booking_number = %updated.booking_number,
            vendor_id = %vendor_id,
            "Booking accepted"
        );

        self.dispatch(
            NotifyTarget::User(updated.user_id),
            BookingNotification::new(
                NotificationKind::BookingAccepted,
                "Request Accepted by Vendor",
                &updated,
                format!(
                    "A vendor has accepted your request {}. Please complete payment to book the service.",
                    updated.booking_number
                ),
            ),
        )
        .await;

        Ok(updated)
    }

    /// Reject a pending booking the vendor owns.
    ///
    /// The guard is deliberately narrower than the general transition table:
    /// only PENDING bookings are rejectable here.
    pub async fn reject_booking(
        &self,
        booking_id: Uuid,
        vendor_id: Uuid,
        input: RejectBookingInput,
    ) -> LifecycleResult<Booking> {
        let booking = self
            .bookings
            .owned_by_vendor(booking_id, vendor_id)
            .await?
            .ok_or(LifecycleError::NotFound("Booking not found"))?;

        if booking.status != BookingStatus::Pending {
            return Err(LifecycleError::InvalidState {
                action: "reject booking",
                current: booking.status,
            });
        }

        let guard = WriteGuard::of(&booking);
        let now = self.clock.now();
        let mut updated = booking;
        updated.status = BookingStatus::Rejected;
        updated.cancelled_at = Some(now);
        updated.cancelled_by = Some(CancelActor::Vendor);
        updated.cancellation_reason = Some(
            input
                .reason
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| "Rejected by vendor".to_string()),
        );
        updated.updated_at = now;

        if !self.bookings.update(&updated, &guard).await? {
            return Err(self.stale_write(booking_id, BookingStatus::Rejected).await);
        }

        self.dispatch(
            NotifyTarget::User(updated.user_id),
            BookingNotification::new(
                NotificationKind::BookingRejected,
                "Booking Rejected",
                &updated,
                format!(
                    "Your booking {} has been rejected by the vendor.",
                    updated.booking_number
                ),
            ),
        )
        .await;

        Ok(updated)
    }

    /// Assign one of the vendor's active workers to a booking.
    ///
    /// A booking accepted but not yet confirmed keeps its status; a CONFIRMED
    /// booking moves to ASSIGNED and reuses the `started_at` slot for the
    /// assignment moment (legacy behavior clients depend on).
    pub async fn assign_worker(
        &self,
        booking_id: Uuid,
        vendor_id: Uuid,
        input: AssignWorkerInput,
    ) -> LifecycleResult<Booking> {
        let booking = self
            .bookings
            .owned_by_vendor(booking_id, vendor_id)
            .await?
            .ok_or(LifecycleError::NotFound("Booking not found"))?;

        let worker = self
            .workers
            .worker_for_vendor(input.worker_id, vendor_id)
            .await?
            .ok_or(LifecycleError::NotFound(
                "Worker not found or does not belong to your vendor account",
            ))?;

        if !worker.is_active() {
            return Err(LifecycleError::WorkerInactive {
                status: worker.status,
            });
        }

        let guard = WriteGuard::of(&booking);
        let now = self.clock.now();
        let mut updated = booking;
        updated.worker_id = Some(worker.id);
        updated.assigned_at = Some(now);
        if updated.status == BookingStatus::Confirmed {
            updated.status = BookingStatus::Assigned;
            updated.started_at = Some(now);
        }
        updated.updated_at = now;

        if !self.bookings.update(&updated, &guard).await? {
            return Err(self.stale_write(booking_id, updated.status).await);
        }

        self.dispatch(
            NotifyTarget::User(updated.user_id),
            BookingNotification::new(
                NotificationKind::WorkerAssigned,
                "Worker Assigned",
                &updated,
                format!(
                    "A worker has been assigned to your booking {}.",
                    updated.booking_number
                ),
            ),
        )
        .await;

        self.dispatch(
            NotifyTarget::Worker(worker.id),
            BookingNotification::new(
                NotificationKind::BookingCreated,
                "New Job Assigned",
                &updated,
                format!(
                    "You have been assigned to booking {}.",
                    updated.booking_number
                ),
            ),
        )
        .await;

        Ok(updated)
    }

    /// Vendor-driven status update, plus the settlement side channels.
    ///
    /// A requested status equal to the current one is not a transition; the
    /// side channels are applied regardless of whether the status changed.
    pub async fn update_booking_status(
        &self,
        booking_id: Uuid,
        vendor_id: Uuid,
        input: UpdateBookingStatusInput,
    ) -> LifecycleResult<Booking> {
        let booking = self
            .bookings
            .owned_by_vendor(booking_id, vendor_id)
            .await?
            .ok_or(LifecycleError::NotFound("Booking not found"))?;

        let transition = input.status.filter(|&next| next != booking.status);

        let Some(next) = transition else {
            // Side channels only; no transition table involved.
            let updated = self
                .bookings
                .set_settlement(
                    booking_id,
                    vendor_id,
                    input.worker_payment_status.as_deref(),
                    input.final_settlement_status.as_deref(),
                    self.clock.now(),
                )
                .await?
                .ok_or(LifecycleError::NotFound("Booking not found"))?;
            return Ok(updated);
        };

        if !transitions::is_allowed(Role::Vendor, booking.status, next) {
            return Err(LifecycleError::InvalidTransition {
                from: booking.status,
                to: next,
            });
        }

        let guard = WriteGuard::of(&booking);
        let now = self.clock.now();
        let mut updated = booking;
        updated.status = next;
        if next == BookingStatus::InProgress && updated.started_at.is_none() {
            updated.started_at = Some(now);
        }
        if next == BookingStatus::Completed {
            updated.completed_at = Some(now);
        }
        if let Some(wps) = input.worker_payment_status {
            updated.worker_payment_status = Some(wps);
        }
        if let Some(fss) = input.final_settlement_status {
            updated.final_settlement_status = Some(fss);
        }
        updated.updated_at = now;

        if !self.bookings.update(&updated, &guard).await? {
            return Err(self.stale_write(booking_id, next).await);
        }

        if next == BookingStatus::Completed {
            self.dispatch(
                NotifyTarget::User(updated.user_id),
                BookingNotification::new(
                    NotificationKind::BookingCompleted,
                    "Booking Completed",
                    &updated,
                    format!(
                        "Your booking {} has been completed. Please rate your experience.",
                        updated.booking_number
                    ),
                ),
            )
            .await;
        }

        Ok(updated)
    }

    pub async fn add_vendor_notes(
        &self,
        booking_id: Uuid,
        vendor_id: Uuid,
        input: NotesInput,
    ) -> LifecycleResult<Booking> {
        if input.notes.trim().is_empty() {
            return Err(LifecycleError::Validation("notes must not be empty"));
        }

        self.bookings
            .set_vendor_notes(booking_id, vendor_id, &input.notes, self.clock.now())
            .await?
            .ok_or(LifecycleError::NotFound("Booking not found"))
    }

    /// Vendor list view with status and scheduled-date filters.
    pub async fn vendor_bookings(
        &self,
        vendor_id: Uuid,
        filter: &VendorBookingFilter,
        page: &PageRequest,
    ) -> LifecycleResult<BookingPage> {
        Ok(self.bookings.list_for_vendor(vendor_id, filter, page).await?)
    }

    pub async fn vendor_booking(
        &self,
        booking_id: Uuid,
        vendor_id: Uuid,
    ) -> LifecycleResult<Booking> {
        self.bookings
            .visible_to_vendor(booking_id, vendor_id)
            .await?
            .ok_or(LifecycleError::NotFound("Booking not found"))
    }

    // ========================================================================
    // Worker operations
    // ========================================================================

    /// Worker-driven status update, validated against the worker table.
    ///
    /// Unlike the vendor path this never notifies anyone; the worker app
    /// polls its own job list.
    pub async fn update_job_status(
        &self,
        booking_id: Uuid,
        worker_id: Uuid,
        input: UpdateJobStatusInput,
    ) -> LifecycleResult<Booking> {
        let booking = self
            .bookings
            .owned_by_worker(booking_id, worker_id)
            .await?
            .ok_or(LifecycleError::NotFound("Job not found"))?;

        let next = input.status;
        if !transitions::is_allowed(Role::Worker, booking.status, next) {
            return Err(LifecycleError::InvalidTransition {
                from: booking.status,
                to: next,
            });
        }

        let guard = WriteGuard::of(&booking);
        let now = self.clock.now();
        let mut updated = booking;
        updated.status = next;
        // VISITED shares the site-engagement timestamp with IN_PROGRESS.
        if matches!(next, BookingStatus::InProgress | BookingStatus::Visited)
            && updated.started_at.is_none()
        {
            updated.started_at = Some(now);
        }
        if next == BookingStatus::Completed {
            updated.completed_at = Some(now);
        }
        updated.updated_at = now;

        if !self.bookings.update(&updated, &guard).await? {
            return Err(self.stale_write(booking_id, next).await);
        }

        Ok(updated)
    }

    /// Mark that the worker started the journey to the site.
    pub async fn start_job(&self, booking_id: Uuid, worker_id: Uuid) -> LifecycleResult<Booking> {
        let booking = self
            .bookings
            .owned_by_worker(booking_id, worker_id)
            .await?
            .ok_or(LifecycleError::NotFound("Job not found"))?;

        if !transitions::START_JOB_STATUSES.contains(&booking.status) {
            return Err(LifecycleError::InvalidState {
                action: "start job",
                current: booking.status,
            });
        }

        let guard = WriteGuard::of(&booking);
        let now = self.clock.now();
        let mut updated = booking;
        updated.status = BookingStatus::Visited;
        updated.started_at = Some(now);
        updated.updated_at = now;

        if !self.bookings.update(&updated, &guard).await? {
            return Err(self.stale_write(booking_id, BookingStatus::Visited).await);
        }

        self.dispatch(
            NotifyTarget::User(updated.user_id),
            BookingNotification::new(
                NotificationKind::WorkerStarted,
                "Worker On The Way",
                &updated,
                format!(
                    "The worker has started the journey for booking {}.",
                    updated.booking_number
                ),
            ),
        )
        .await;

        if let Some(vendor) = updated.vendor_id {
            self.dispatch(
                NotifyTarget::Vendor(vendor),
                BookingNotification::new(
                    NotificationKind::WorkerStarted,
                    "Worker Started Journey",
                    &updated,
                    format!(
                        "Your worker has started the journey for booking {}.",
                        updated.booking_number
                    ),
                ),
            )
            .await;
        }

        Ok(updated)
    }

    /// Mark the on-site work done.
    ///
    /// Does not stamp `completed_at`: that slot belongs to the vendor's
    /// settlement confirmation.
    pub async fn complete_job(&self, booking_id: Uuid, worker_id: Uuid) -> LifecycleResult<Booking> {
        let booking = self
            .bookings
            .owned_by_worker(booking_id, worker_id)
            .await?
            .ok_or(LifecycleError::NotFound("Job not found"))?;

        if !transitions::COMPLETE_JOB_STATUSES.contains(&booking.status) {
            return Err(LifecycleError::InvalidState {
                action: "complete job",
                current: booking.status,
            });
        }

        let guard = WriteGuard::of(&booking);
        let now = self.clock.now();
        let mut updated = booking;
        updated.status = BookingStatus::WorkDone;
        updated.updated_at = now;

        if !self.bookings.update(&updated, &guard).await? {
            return Err(self.stale_write(booking_id, BookingStatus::WorkDone).await);
        }

        if let Some(vendor) = updated.vendor_id {
            self.dispatch(
                NotifyTarget::Vendor(vendor),
                BookingNotification::new(
                    NotificationKind::WorkerCompleted,
                    "Work Done",
                    &updated,
                    format!(
                        "Your worker has marked work as done for booking {}. Please review.",
                        updated.booking_number
                    ),
                ),
            )
            .await;
        }

        Ok(updated)
    }

    pub async fn add_worker_notes(
        &self,
        booking_id: Uuid,
        worker_id: Uuid,
        input: NotesInput,
    ) -> LifecycleResult<Booking> {
        if input.notes.trim().is_empty() {
            return Err(LifecycleError::Validation("notes must not be empty"));
        }

        self.bookings
            .set_worker_notes(booking_id, worker_id, &input.notes, self.clock.now())
            .await?
            .ok_or(LifecycleError::NotFound("Job not found"))
    }

    pub async fn worker_jobs(
        &self,
        worker_id: Uuid,
        filter: &WorkerJobFilter,
        page: &PageRequest,
    ) -> LifecycleResult<BookingPage> {
        Ok(self.bookings.list_for_worker(worker_id, filter, page).await?)
    }

    pub async fn worker_job(&self, booking_id: Uuid, worker_id: Uuid) -> LifecycleResult<Booking> {
        self.bookings
            .owned_by_worker(booking_id, worker_id)
            .await?
            .ok_or(LifecycleError::NotFound("Job not found"))
    }

    /// Worker dashboard aggregation: earnings, job counts, average rating
    /// and the five most recent jobs. Pure projection, no mutation.
    pub async fn worker_dashboard(&self, worker_id: Uuid) -> LifecycleResult<DashboardStats> {
        let worker = self
            .workers
            .worker_by_id(worker_id)
            .await?
            .ok_or(LifecycleError::NotFound("Worker not found"))?;

        let jobs = self.bookings.all_for_worker(worker_id).await?;

        let total_earnings: f64 = jobs
            .iter()
            .filter(|b| transitions::SETTLED_JOB_STATUSES.contains(&b.status))
            .filter_map(|b| b.final_amount)
            .sum();

        let active_jobs = jobs
            .iter()
            .filter(|b| transitions::ACTIVE_JOB_STATUSES.contains(&b.status))
            .count() as u64;

        let completed_jobs = jobs
            .iter()
            .filter(|b| transitions::SETTLED_JOB_STATUSES.contains(&b.status))
            .count() as u64;

        let ratings: Vec<f64> = jobs.iter().filter_map(|b| b.rating).collect();
        let rating = if ratings.is_empty() {
            worker.rating.unwrap_or(0.0)
        } else {
            let avg = ratings.iter().sum::<f64>() / ratings.len() as f64;
            (avg * 10.0).round() / 10.0
        };

        let recent_jobs = jobs.into_iter().take(5).collect();

        Ok(DashboardStats {
            total_earnings,
            active_jobs,
            completed_jobs,
            rating,
            recent_jobs,
        })
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Recompute the failure for an accept that lost its conditional write.
    async fn accept_conflict(&self, booking_id: Uuid, vendor_id: Uuid) -> LifecycleError {
        match self.bookings.by_id(booking_id).await {
            Ok(Some(current)) => match current.vendor_id {
                Some(owner) if owner != vendor_id => LifecycleError::AlreadyAssigned,
                _ => LifecycleError::InvalidState {
                    action: "accept booking",
                    current: current.status,
                },
            },
            Ok(None) => LifecycleError::NotFound("Booking not found"),
            Err(err) => err.into(),
        }
    }

    /// Recompute the failure for any other lost conditional write.
    async fn stale_write(&self, booking_id: Uuid, attempted: BookingStatus) -> LifecycleError {
        match self.bookings.by_id(booking_id).await {
            Ok(Some(current)) => LifecycleError::InvalidTransition {
                from: current.status,
                to: attempted,
            },
            Ok(None) => LifecycleError::NotFound("Booking not found"),
            Err(err) => err.into(),
        }
    }

    /// Post-commit notification dispatch. Failures are logged and swallowed;
    /// the transition has already committed.
    async fn dispatch(&self, target: NotifyTarget, notification: BookingNotification) {
        let kind = notification.kind;
        let booking_id = notification.booking_id;
        if let Err(err) = self.notifier.notify(target, notification).await {
            tracing::warn!(
                ?target,
                %kind,
                %booking_id,
                error = %err,
                "Notification dispatch failed"
            );
        }
    }
}
