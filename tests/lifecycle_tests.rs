//! Engine-level tests for the booking lifecycle: transition tables, guard
//! conditions, timestamp policy, concurrency and notification fan-out.

mod common;

use chrono::Duration;
use uuid::Uuid;

use common::*;
use homecrew_backend::domain::booking::{
    AssignWorkerInput, BookingStatus, CancelActor, NotesInput, RejectBookingInput,
    UpdateBookingStatusInput, UpdateJobStatusInput,
};
use homecrew_backend::domain::notifications::NotifyTarget;
use homecrew_backend::lifecycle::transitions::{allowed_targets, Role};
use homecrew_backend::lifecycle::LifecycleError;
use homecrew_backend::store::{BookingStore, PageRequest, VendorBookingFilter, WorkerJobFilter, WorkerStore};

// ── Accepting ──

#[tokio::test]
async fn accept_assigns_vendor_and_awaits_payment() {
    let h = harness();
    let vendor = Uuid::new_v4();
    let b = booking(BookingStatus::Requested);
    h.store.insert(&b).await.unwrap();

    let accepted = h.engine.accept_booking(b.id, vendor).await.unwrap();

    assert_eq!(accepted.status, BookingStatus::AwaitingPayment);
    assert_eq!(accepted.vendor_id, Some(vendor));
    assert_eq!(accepted.accepted_at, Some(t0()));

    let stored = h.store.by_id(b.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::AwaitingPayment);

    assert_eq!(h.notifier.kinds(), vec!["booking_accepted"]);
    assert_eq!(h.notifier.targets(), vec![NotifyTarget::User(b.user_id)]);
}

#[tokio::test]
async fn accept_from_searching_succeeds() {
    let h = harness();
    let b = booking(BookingStatus::Searching);
    h.store.insert(&b).await.unwrap();

    let accepted = h.engine.accept_booking(b.id, Uuid::new_v4()).await.unwrap();
    assert_eq!(accepted.status, BookingStatus::AwaitingPayment);
}

#[tokio::test]
async fn accept_is_idempotent_for_the_same_vendor() {
    let h = harness();
    let vendor = Uuid::new_v4();
    let b = booking(BookingStatus::Requested);
    h.store.insert(&b).await.unwrap();

    let first = h.engine.accept_booking(b.id, vendor).await.unwrap();
    h.clock.advance_secs(60);
    let second = h.engine.accept_booking(b.id, vendor).await.unwrap();

    assert_eq!(second.vendor_id, Some(vendor));
    assert_eq!(second.accepted_at, first.accepted_at, "re-accept must not restamp");
    assert_eq!(second.status, BookingStatus::AwaitingPayment);
}

#[tokio::test]
async fn accept_by_second_vendor_is_rejected() {
    let h = harness();
    let (v1, v2) = (Uuid::new_v4(), Uuid::new_v4());
    let b = booking(BookingStatus::Requested);
    h.store.insert(&b).await.unwrap();

    h.engine.accept_booking(b.id, v1).await.unwrap();
    let err = h.engine.accept_booking(b.id, v2).await.unwrap_err();

    assert!(matches!(err, LifecycleError::AlreadyAssigned));
    let stored = h.store.by_id(b.id).await.unwrap().unwrap();
    assert_eq!(stored.vendor_id, Some(v1));
}

#[tokio::test]
async fn accept_requires_requested_or_searching() {
    let h = harness();
    let b = booking(BookingStatus::Pending);
    h.store.insert(&b).await.unwrap();

    let err = h.engine.accept_booking(b.id, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::InvalidState {
            current: BookingStatus::Pending,
            ..
        }
    ));
    assert_eq!(err.to_string(), "Cannot accept booking with status: PENDING");
}

#[tokio::test]
async fn accept_missing_booking_is_not_found() {
    let h = harness();
    let err = h
        .engine
        .accept_booking(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound(_)));
}

#[tokio::test]
async fn concurrent_accepts_have_one_winner() {
    let h = harness();
    let (v1, v2) = (Uuid::new_v4(), Uuid::new_v4());
    let b = booking(BookingStatus::Requested);
    h.store.insert(&b).await.unwrap();

    let (r1, r2) = tokio::join!(
        h.engine.accept_booking(b.id, v1),
        h.engine.accept_booking(b.id, v2)
    );

    let winners = [r1.is_ok(), r2.is_ok()].iter().filter(|&&ok| ok).count();
    assert_eq!(winners, 1, "exactly one accept must win");

    let loser = if r1.is_err() { r1.unwrap_err() } else { r2.unwrap_err() };
    assert!(matches!(loser, LifecycleError::AlreadyAssigned));

    let stored = h.store.by_id(b.id).await.unwrap().unwrap();
    assert!(stored.vendor_id == Some(v1) || stored.vendor_id == Some(v2));
    assert_eq!(stored.status, BookingStatus::AwaitingPayment);
}

// ── Rejecting ──

#[tokio::test]
async fn reject_marks_booking_rejected() {
    let h = harness();
    let vendor = Uuid::new_v4();
    let b = vendor_booking(BookingStatus::Pending, vendor);
    h.store.insert(&b).await.unwrap();

    let rejected = h
        .engine
        .reject_booking(b.id, vendor, RejectBookingInput { reason: None })
        .await
        .unwrap();

    assert_eq!(rejected.status, BookingStatus::Rejected);
    assert_eq!(rejected.cancelled_by, Some(CancelActor::Vendor));
    assert_eq!(rejected.cancellation_reason.as_deref(), Some("Rejected by vendor"));
    assert_eq!(rejected.cancelled_at, Some(t0()));
    assert_eq!(h.notifier.kinds(), vec!["booking_rejected"]);
}

#[tokio::test]
async fn reject_keeps_a_custom_reason() {
    let h = harness();
    let vendor = Uuid::new_v4();
    let b = vendor_booking(BookingStatus::Pending, vendor);
    h.store.insert(&b).await.unwrap();

    let rejected = h
        .engine
        .reject_booking(
            b.id,
            vendor,
            RejectBookingInput {
                reason: Some("No availability this week".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(
        rejected.cancellation_reason.as_deref(),
        Some("No availability this week")
    );
}

#[tokio::test]
async fn reject_requires_pending_status() {
    // The guard predates the payment flow: AWAITING_PAYMENT bookings are not
    // rejectable here even though the general table allows the transition.
    let h = harness();
    let vendor = Uuid::new_v4();
    let b = vendor_booking(BookingStatus::AwaitingPayment, vendor);
    h.store.insert(&b).await.unwrap();

    let err = h
        .engine
        .reject_booking(b.id, vendor, RejectBookingInput::default())
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Cannot reject booking with status: AWAITING_PAYMENT"
    );
}

#[tokio::test]
async fn reject_unowned_booking_is_not_found() {
    let h = harness();
    let b = vendor_booking(BookingStatus::Pending, Uuid::new_v4());
    h.store.insert(&b).await.unwrap();

    let err = h
        .engine
        .reject_booking(b.id, Uuid::new_v4(), RejectBookingInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound("Booking not found")));
}

// ── Worker assignment ──

#[tokio::test]
async fn assign_worker_sets_worker_and_assigned_at() {
    let h = harness();
    let vendor = Uuid::new_v4();
    let w = worker(vendor);
    h.store.insert_worker(&w).await.unwrap();
    let b = vendor_booking(BookingStatus::AwaitingPayment, vendor);
    h.store.insert(&b).await.unwrap();

    let updated = h
        .engine
        .assign_worker(b.id, vendor, AssignWorkerInput { worker_id: w.id })
        .await
        .unwrap();

    assert_eq!(updated.worker_id, Some(w.id));
    assert_eq!(updated.assigned_at, Some(t0()));
    // No status side effect outside CONFIRMED.
    assert_eq!(updated.status, BookingStatus::AwaitingPayment);
    assert_eq!(updated.started_at, None);

    assert_eq!(h.notifier.kinds(), vec!["worker_assigned", "booking_created"]);
    assert_eq!(
        h.notifier.targets(),
        vec![NotifyTarget::User(b.user_id), NotifyTarget::Worker(w.id)]
    );
}

#[tokio::test]
async fn assign_worker_from_confirmed_moves_to_assigned() {
    let h = harness();
    let vendor = Uuid::new_v4();
    let w = worker(vendor);
    h.store.insert_worker(&w).await.unwrap();
    let b = vendor_booking(BookingStatus::Confirmed, vendor);
    h.store.insert(&b).await.unwrap();

    let updated = h
        .engine
        .assign_worker(b.id, vendor, AssignWorkerInput { worker_id: w.id })
        .await
        .unwrap();

    assert_eq!(updated.status, BookingStatus::Assigned);
    // Assignment reuses the site-engagement timestamp slot.
    assert_eq!(updated.started_at, Some(t0()));
}

#[tokio::test]
async fn assign_worker_cross_vendor_is_not_found() {
    let h = harness();
    let vendor = Uuid::new_v4();
    let foreign_worker = worker(Uuid::new_v4());
    h.store.insert_worker(&foreign_worker).await.unwrap();
    let b = vendor_booking(BookingStatus::Confirmed, vendor);
    h.store.insert(&b).await.unwrap();

    let err = h
        .engine
        .assign_worker(
            b.id,
            vendor,
            AssignWorkerInput {
                worker_id: foreign_worker.id,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LifecycleError::NotFound("Worker not found or does not belong to your vendor account")
    ));

    let stored = h.store.by_id(b.id).await.unwrap().unwrap();
    assert_eq!(stored.worker_id, None);
    assert_eq!(stored.assigned_at, None);
    assert_eq!(stored.status, BookingStatus::Confirmed);
}

#[tokio::test]
async fn assign_worker_requires_active_worker() {
    let h = harness();
    let vendor = Uuid::new_v4();
    let mut w = worker(vendor);
    w.status = "inactive".to_string();
    h.store.insert_worker(&w).await.unwrap();
    let b = vendor_booking(BookingStatus::Confirmed, vendor);
    h.store.insert(&b).await.unwrap();

    let err = h
        .engine
        .assign_worker(b.id, vendor, AssignWorkerInput { worker_id: w.id })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Worker is not active (Status: inactive)");
}

#[tokio::test]
async fn assign_worker_accepts_legacy_status_tokens() {
    let h = harness();
    let vendor = Uuid::new_v4();
    let mut w = worker(vendor);
    w.status = "ONLINE".to_string();
    h.store.insert_worker(&w).await.unwrap();
    let b = vendor_booking(BookingStatus::AwaitingPayment, vendor);
    h.store.insert(&b).await.unwrap();

    assert!(h
        .engine
        .assign_worker(b.id, vendor, AssignWorkerInput { worker_id: w.id })
        .await
        .is_ok());
}

// ── Vendor status updates ──

fn status_input(status: BookingStatus) -> UpdateBookingStatusInput {
    UpdateBookingStatusInput {
        status: Some(status),
        ..Default::default()
    }
}

#[tokio::test]
async fn vendor_table_allows_every_listed_transition() {
    for from in BookingStatus::ALL {
        for &to in allowed_targets(Role::Vendor, from) {
            let h = harness();
            let vendor = Uuid::new_v4();
            let b = vendor_booking(from, vendor);
            h.store.insert(&b).await.unwrap();

            let updated = h
                .engine
                .update_booking_status(b.id, vendor, status_input(to))
                .await
                .unwrap_or_else(|e| panic!("{from} -> {to} should be allowed: {e}"));
            assert_eq!(updated.status, to);
        }
    }
}

#[tokio::test]
async fn vendor_table_rejects_every_unlisted_transition() {
    for from in BookingStatus::ALL {
        for to in BookingStatus::ALL {
            if to == from || allowed_targets(Role::Vendor, from).contains(&to) {
                continue;
            }
            let h = harness();
            let vendor = Uuid::new_v4();
            let b = vendor_booking(from, vendor);
            h.store.insert(&b).await.unwrap();

            let err = h
                .engine
                .update_booking_status(b.id, vendor, status_input(to))
                .await
                .unwrap_err();
            assert!(
                matches!(err, LifecycleError::InvalidTransition { .. }),
                "{from} -> {to} should be rejected"
            );
            assert_eq!(
                err.to_string(),
                format!("Invalid status transition from {from} to {to}")
            );

            let stored = h.store.by_id(b.id).await.unwrap().unwrap();
            assert_eq!(stored.status, from, "status must stay untouched");
        }
    }
}

#[tokio::test]
async fn in_progress_stamps_started_at_only_once() {
    let h = harness();
    let vendor = Uuid::new_v4();
    let b = vendor_booking(BookingStatus::Confirmed, vendor);
    h.store.insert(&b).await.unwrap();

    let updated = h
        .engine
        .update_booking_status(b.id, vendor, status_input(BookingStatus::InProgress))
        .await
        .unwrap();
    assert_eq!(updated.started_at, Some(t0()));

    // A later re-entry into IN_PROGRESS keeps the original timestamp.
    let mut b2 = vendor_booking(BookingStatus::Assigned, vendor);
    b2.started_at = Some(t0() - Duration::hours(1));
    h.store.insert(&b2).await.unwrap();
    h.clock.advance_secs(600);

    let updated = h
        .engine
        .update_booking_status(b2.id, vendor, status_input(BookingStatus::InProgress))
        .await
        .unwrap();
    assert_eq!(updated.started_at, Some(t0() - Duration::hours(1)));
}

#[tokio::test]
async fn completing_stamps_completed_at_and_notifies_user() {
    let h = harness();
    let vendor = Uuid::new_v4();
    let b = vendor_booking(BookingStatus::WorkDone, vendor);
    h.store.insert(&b).await.unwrap();

    let updated = h
        .engine
        .update_booking_status(b.id, vendor, status_input(BookingStatus::Completed))
        .await
        .unwrap();

    assert_eq!(updated.status, BookingStatus::Completed);
    assert_eq!(updated.completed_at, Some(t0()));
    assert_eq!(h.notifier.kinds(), vec!["booking_completed"]);
    assert_eq!(h.notifier.targets(), vec![NotifyTarget::User(b.user_id)]);
}

#[tokio::test]
async fn side_channels_update_without_a_transition() {
    let h = harness();
    let vendor = Uuid::new_v4();
    let b = vendor_booking(BookingStatus::WorkDone, vendor);
    h.store.insert(&b).await.unwrap();

    let updated = h
        .engine
        .update_booking_status(
            b.id,
            vendor,
            UpdateBookingStatusInput {
                status: None,
                worker_payment_status: Some("paid".to_string()),
                final_settlement_status: Some("settled".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, BookingStatus::WorkDone);
    assert_eq!(updated.worker_payment_status.as_deref(), Some("paid"));
    assert_eq!(updated.final_settlement_status.as_deref(), Some("settled"));
    assert_eq!(h.notifier.count(), 0);
}

#[tokio::test]
async fn same_status_is_not_a_transition() {
    // Re-sending the current status must not hit the transition table, even
    // for terminal states, and must not re-notify.
    let h = harness();
    let vendor = Uuid::new_v4();
    let b = vendor_booking(BookingStatus::Completed, vendor);
    h.store.insert(&b).await.unwrap();

    let updated = h
        .engine
        .update_booking_status(
            b.id,
            vendor,
            UpdateBookingStatusInput {
                status: Some(BookingStatus::Completed),
                worker_payment_status: Some("paid".to_string()),
                final_settlement_status: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, BookingStatus::Completed);
    assert_eq!(updated.worker_payment_status.as_deref(), Some("paid"));
    assert_eq!(h.notifier.count(), 0);
}

#[tokio::test]
async fn side_channels_apply_alongside_a_transition() {
    let h = harness();
    let vendor = Uuid::new_v4();
    let b = vendor_booking(BookingStatus::InProgress, vendor);
    h.store.insert(&b).await.unwrap();

    let updated = h
        .engine
        .update_booking_status(
            b.id,
            vendor,
            UpdateBookingStatusInput {
                status: Some(BookingStatus::WorkDone),
                worker_payment_status: Some("pending".to_string()),
                final_settlement_status: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, BookingStatus::WorkDone);
    assert_eq!(updated.worker_payment_status.as_deref(), Some("pending"));
}

// ── Notes ──

#[tokio::test]
async fn notes_overwrite_without_touching_status() {
    let h = harness();
    let vendor = Uuid::new_v4();
    let worker_id = Uuid::new_v4();
    let b = worker_booking(BookingStatus::InProgress, vendor, worker_id);
    h.store.insert(&b).await.unwrap();

    let updated = h
        .engine
        .add_vendor_notes(
            b.id,
            vendor,
            NotesInput {
                notes: "Bring spare parts".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.vendor_notes.as_deref(), Some("Bring spare parts"));

    let updated = h
        .engine
        .add_worker_notes(
            b.id,
            worker_id,
            NotesInput {
                notes: "Replaced the valve".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.worker_notes.as_deref(), Some("Replaced the valve"));
    assert_eq!(updated.vendor_notes.as_deref(), Some("Bring spare parts"));
    assert_eq!(updated.status, BookingStatus::InProgress);
    assert_eq!(h.notifier.count(), 0);
}

#[tokio::test]
async fn empty_notes_fail_validation() {
    let h = harness();
    let vendor = Uuid::new_v4();
    let b = vendor_booking(BookingStatus::InProgress, vendor);
    h.store.insert(&b).await.unwrap();

    let err = h
        .engine
        .add_vendor_notes(
            b.id,
            vendor,
            NotesInput {
                notes: "   ".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Validation(_)));
}

// ── Worker status updates ──

#[tokio::test]
async fn worker_table_rejects_assigned_to_work_done() {
    // The worker table only allows ASSIGNED -> {VISITED, IN_PROGRESS}; the
    // same jump is legal for a vendor, so this guards the role split.
    let h = harness();
    let worker_id = Uuid::new_v4();
    let b = worker_booking(BookingStatus::Assigned, Uuid::new_v4(), worker_id);
    h.store.insert(&b).await.unwrap();

    let err = h
        .engine
        .update_job_status(
            b.id,
            worker_id,
            UpdateJobStatusInput {
                status: BookingStatus::WorkDone,
            },
        )
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Invalid status transition from ASSIGNED to WORK_DONE"
    );
}

#[tokio::test]
async fn worker_visited_stamps_started_at_when_unset() {
    let h = harness();
    let worker_id = Uuid::new_v4();
    let b = worker_booking(BookingStatus::Assigned, Uuid::new_v4(), worker_id);
    h.store.insert(&b).await.unwrap();

    let updated = h
        .engine
        .update_job_status(
            b.id,
            worker_id,
            UpdateJobStatusInput {
                status: BookingStatus::Visited,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, BookingStatus::Visited);
    assert_eq!(updated.started_at, Some(t0()));
    // Worker status updates are silent.
    assert_eq!(h.notifier.count(), 0);
}

#[tokio::test]
async fn worker_completion_stamps_completed_at() {
    let h = harness();
    let worker_id = Uuid::new_v4();
    let b = worker_booking(BookingStatus::InProgress, Uuid::new_v4(), worker_id);
    h.store.insert(&b).await.unwrap();

    let updated = h
        .engine
        .update_job_status(
            b.id,
            worker_id,
            UpdateJobStatusInput {
                status: BookingStatus::Completed,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.completed_at, Some(t0()));
}

#[tokio::test]
async fn worker_cannot_touch_an_unassigned_booking() {
    let h = harness();
    let b = vendor_booking(BookingStatus::Assigned, Uuid::new_v4());
    h.store.insert(&b).await.unwrap();

    let err = h
        .engine
        .update_job_status(
            b.id,
            Uuid::new_v4(),
            UpdateJobStatusInput {
                status: BookingStatus::Visited,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound("Job not found")));
}

// ── startJob / completeJob ──

#[tokio::test]
async fn start_job_moves_to_visited_and_notifies_both_sides() {
    let h = harness();
    let vendor = Uuid::new_v4();
    let worker_id = Uuid::new_v4();
    let b = worker_booking(BookingStatus::Assigned, vendor, worker_id);
    h.store.insert(&b).await.unwrap();

    let updated = h.engine.start_job(b.id, worker_id).await.unwrap();

    assert_eq!(updated.status, BookingStatus::Visited);
    assert_eq!(updated.started_at, Some(t0()));
    assert_eq!(h.notifier.kinds(), vec!["worker_started", "worker_started"]);
    assert_eq!(
        h.notifier.targets(),
        vec![NotifyTarget::User(b.user_id), NotifyTarget::Vendor(vendor)]
    );
}

#[tokio::test]
async fn start_job_overwrites_an_existing_started_at() {
    let h = harness();
    let worker_id = Uuid::new_v4();
    let mut b = worker_booking(BookingStatus::Confirmed, Uuid::new_v4(), worker_id);
    b.started_at = Some(t0() - Duration::hours(2));
    h.store.insert(&b).await.unwrap();
    h.clock.advance_secs(300);

    let updated = h.engine.start_job(b.id, worker_id).await.unwrap();
    assert_eq!(updated.started_at, Some(t0() + Duration::seconds(300)));
}

#[tokio::test]
async fn start_job_cannot_run_twice() {
    let h = harness();
    let worker_id = Uuid::new_v4();
    let b = worker_booking(BookingStatus::Assigned, Uuid::new_v4(), worker_id);
    h.store.insert(&b).await.unwrap();

    h.engine.start_job(b.id, worker_id).await.unwrap();
    let err = h.engine.start_job(b.id, worker_id).await.unwrap_err();

    assert_eq!(err.to_string(), "Cannot start job with status: VISITED");
}

#[tokio::test]
async fn complete_job_reaches_work_done_without_completed_at() {
    let h = harness();
    let vendor = Uuid::new_v4();
    let worker_id = Uuid::new_v4();
    let b = worker_booking(BookingStatus::Visited, vendor, worker_id);
    h.store.insert(&b).await.unwrap();

    let updated = h.engine.complete_job(b.id, worker_id).await.unwrap();

    assert_eq!(updated.status, BookingStatus::WorkDone);
    assert_eq!(updated.completed_at, None, "settlement stamps completion");
    // Vendor only; the user hears about it at settlement.
    assert_eq!(h.notifier.targets(), vec![NotifyTarget::Vendor(vendor)]);
    assert_eq!(h.notifier.kinds(), vec!["worker_completed"]);

    // The vendor settlement confirmation is what stamps completed_at.
    let settled = h
        .engine
        .update_booking_status(b.id, vendor, status_input(BookingStatus::Completed))
        .await
        .unwrap();
    assert_eq!(settled.completed_at, Some(t0()));
}

#[tokio::test]
async fn complete_job_requires_visited_or_in_progress() {
    let h = harness();
    let worker_id = Uuid::new_v4();
    let b = worker_booking(BookingStatus::Assigned, Uuid::new_v4(), worker_id);
    h.store.insert(&b).await.unwrap();

    let err = h.engine.complete_job(b.id, worker_id).await.unwrap_err();
    assert_eq!(err.to_string(), "Cannot complete job with status: ASSIGNED");
}

// ── Notification failures ──

#[tokio::test]
async fn notifier_failure_does_not_roll_back_the_transition() {
    let (engine, store) = failing_harness();
    let vendor = Uuid::new_v4();
    let b = booking(BookingStatus::Requested);
    store.insert(&b).await.unwrap();

    let accepted = engine.accept_booking(b.id, vendor).await.unwrap();
    assert_eq!(accepted.status, BookingStatus::AwaitingPayment);

    let stored = store.by_id(b.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::AwaitingPayment);
    assert_eq!(stored.vendor_id, Some(vendor));
}

// ── Full scenario ──

#[tokio::test]
async fn full_lifecycle_walkthrough() {
    let h = harness();
    let vendor = Uuid::new_v4();
    let w = worker(vendor);
    h.store.insert_worker(&w).await.unwrap();

    let b = booking(BookingStatus::Requested);
    h.store.insert(&b).await.unwrap();

    // Vendor claims the request.
    let accepted = h.engine.accept_booking(b.id, vendor).await.unwrap();
    assert_eq!(accepted.status, BookingStatus::AwaitingPayment);
    assert_eq!(accepted.vendor_id, Some(vendor));
    assert!(accepted.accepted_at.is_some());

    // Payment confirmed.
    h.engine
        .update_booking_status(b.id, vendor, status_input(BookingStatus::Confirmed))
        .await
        .unwrap();

    // Worker assigned; CONFIRMED flips to ASSIGNED and stamps started_at.
    let assigned = h
        .engine
        .assign_worker(b.id, vendor, AssignWorkerInput { worker_id: w.id })
        .await
        .unwrap();
    assert_eq!(assigned.status, BookingStatus::Assigned);
    assert_eq!(assigned.worker_id, Some(w.id));
    assert!(assigned.started_at.is_some());

    // The worker cannot jump straight to WORK_DONE from ASSIGNED.
    let err = h
        .engine
        .update_job_status(
            b.id,
            w.id,
            UpdateJobStatusInput {
                status: BookingStatus::WorkDone,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidTransition { .. }));

    // On site, work done, then vendor settles.
    h.engine
        .update_job_status(
            b.id,
            w.id,
            UpdateJobStatusInput {
                status: BookingStatus::Visited,
            },
        )
        .await
        .unwrap();
    h.engine.complete_job(b.id, w.id).await.unwrap();
    let settled = h
        .engine
        .update_booking_status(b.id, vendor, status_input(BookingStatus::Completed))
        .await
        .unwrap();

    assert_eq!(settled.status, BookingStatus::Completed);
    assert!(settled.completed_at.is_some());
}

// ── Read projections ──

#[tokio::test]
async fn vendor_list_includes_own_and_unassigned_requests() {
    let h = harness();
    let vendor = Uuid::new_v4();

    let own = vendor_booking(BookingStatus::Confirmed, vendor);
    let own_awaiting = vendor_booking(BookingStatus::AwaitingPayment, vendor);
    let open = booking(BookingStatus::Requested);
    let foreign = vendor_booking(BookingStatus::Confirmed, Uuid::new_v4());
    for b in [&own, &own_awaiting, &open, &foreign] {
        h.store.insert(b).await.unwrap();
    }

    let page = h
        .engine
        .vendor_bookings(
            vendor,
            &VendorBookingFilter::default(),
            &PageRequest { page: 1, limit: 10 },
        )
        .await
        .unwrap();

    let ids: Vec<Uuid> = page.items.iter().map(|b| b.id).collect();
    assert!(ids.contains(&own.id));
    assert!(ids.contains(&open.id), "unassigned requests are visible");
    assert!(!ids.contains(&own_awaiting.id), "awaiting payment is hidden");
    assert!(!ids.contains(&foreign.id));
    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn vendor_list_filters_by_status() {
    let h = harness();
    let vendor = Uuid::new_v4();
    h.store
        .insert(&vendor_booking(BookingStatus::Confirmed, vendor))
        .await
        .unwrap();
    h.store
        .insert(&vendor_booking(BookingStatus::WorkDone, vendor))
        .await
        .unwrap();

    let page = h
        .engine
        .vendor_bookings(
            vendor,
            &VendorBookingFilter {
                status: Some(BookingStatus::WorkDone),
                ..Default::default()
            },
            &PageRequest { page: 1, limit: 10 },
        )
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].status, BookingStatus::WorkDone);
}

#[tokio::test]
async fn vendor_detail_hides_other_vendors_bookings() {
    let h = harness();
    let vendor = Uuid::new_v4();
    let foreign = vendor_booking(BookingStatus::Confirmed, Uuid::new_v4());
    h.store.insert(&foreign).await.unwrap();

    let err = h.engine.vendor_booking(foreign.id, vendor).await.unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound(_)));

    // Unassigned requests stay visible to any vendor.
    let open = booking(BookingStatus::Searching);
    h.store.insert(&open).await.unwrap();
    assert!(h.engine.vendor_booking(open.id, vendor).await.is_ok());
}

#[tokio::test]
async fn worker_list_is_strictly_scoped() {
    let h = harness();
    let worker_id = Uuid::new_v4();
    let mine = worker_booking(BookingStatus::Assigned, Uuid::new_v4(), worker_id);
    let other = worker_booking(BookingStatus::Assigned, Uuid::new_v4(), Uuid::new_v4());
    h.store.insert(&mine).await.unwrap();
    h.store.insert(&other).await.unwrap();

    let page = h
        .engine
        .worker_jobs(
            worker_id,
            &WorkerJobFilter::default(),
            &PageRequest { page: 1, limit: 10 },
        )
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, mine.id);
}

// ── Dashboard ──

#[tokio::test]
async fn dashboard_aggregates_earnings_counts_and_rating() {
    let h = harness();
    let vendor = Uuid::new_v4();
    let w = worker(vendor);
    h.store.insert_worker(&w).await.unwrap();

    let mut completed = worker_booking(BookingStatus::Completed, vendor, w.id);
    completed.final_amount = Some(100.0);
    completed.rating = Some(5.0);
    let mut done = worker_booking(BookingStatus::WorkDone, vendor, w.id);
    done.final_amount = Some(50.0);
    done.rating = Some(4.0);
    let active_a = worker_booking(BookingStatus::Assigned, vendor, w.id);
    let active_b = worker_booking(BookingStatus::Confirmed, vendor, w.id);
    let mut cancelled = worker_booking(BookingStatus::Cancelled, vendor, w.id);
    cancelled.final_amount = Some(70.0);
    for b in [&completed, &done, &active_a, &active_b, &cancelled] {
        h.store.insert(b).await.unwrap();
    }

    let stats = h.engine.worker_dashboard(w.id).await.unwrap();

    assert_eq!(stats.total_earnings, 150.0);
    assert_eq!(stats.active_jobs, 2);
    assert_eq!(stats.completed_jobs, 2);
    assert_eq!(stats.rating, 4.5);
    assert_eq!(stats.recent_jobs.len(), 5);
}

#[tokio::test]
async fn dashboard_rating_falls_back_to_worker_profile() {
    let h = harness();
    let vendor = Uuid::new_v4();
    let mut w = worker(vendor);
    w.rating = Some(4.2);
    h.store.insert_worker(&w).await.unwrap();
    h.store
        .insert(&worker_booking(BookingStatus::Assigned, vendor, w.id))
        .await
        .unwrap();

    let stats = h.engine.worker_dashboard(w.id).await.unwrap();
    assert_eq!(stats.rating, 4.2);
}

#[tokio::test]
async fn dashboard_for_unknown_worker_is_not_found() {
    let h = harness();
    let err = h.engine.worker_dashboard(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound("Worker not found")));
}
