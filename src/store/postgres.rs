//! Postgres store.
//!
//! Hand-written SQL over a shared pool. Conditional writes re-validate the
//! pre-read `(status, vendor_id)` pair inside the UPDATE's WHERE clause, so
//! the compare and the write are one atomic statement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::booking::{Booking, BookingStatus, CancelActor};
use crate::domain::worker::Worker;
use crate::store::{
    BookingPage, BookingStore, PageRequest, StoreError, VendorBookingFilter, WorkerJobFilter,
    WorkerStore, WriteGuard,
};

const BOOKING_COLUMNS: &str = "id, booking_number, status, user_id, vendor_id, worker_id, \
     service_id, category_id, scheduled_date, final_amount, rating, vendor_notes, worker_notes, \
     worker_payment_status, final_settlement_status, cancelled_by, cancellation_reason, \
     accepted_at, assigned_at, started_at, completed_at, cancelled_at, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    booking_number: String,
    status: String,
    user_id: Uuid,
    vendor_id: Option<Uuid>,
    worker_id: Option<Uuid>,
    service_id: Uuid,
    category_id: Uuid,
    scheduled_date: DateTime<Utc>,
    final_amount: Option<sqlx::types::Decimal>,
    rating: Option<f64>,
    vendor_notes: Option<String>,
    worker_notes: Option<String>,
    worker_payment_status: Option<String>,
    final_settlement_status: Option<String>,
    cancelled_by: Option<String>,
    cancellation_reason: Option<String>,
    accepted_at: Option<DateTime<Utc>>,
    assigned_at: Option<DateTime<Utc>>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn decimal_to_f64(d: sqlx::types::Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

fn f64_to_decimal(v: f64) -> sqlx::types::Decimal {
    sqlx::types::Decimal::from_f64_retain(v).unwrap_or_default()
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status: BookingStatus = row.status.parse().map_err(StoreError::Corrupt)?;
        let cancelled_by = row
            .cancelled_by
            .map(|s| s.parse::<CancelActor>())
            .transpose()
            .map_err(StoreError::Corrupt)?;

        Ok(Booking {
            id: row.id,
            booking_number: row.booking_number,
            status,
            user_id: row.user_id,
            vendor_id: row.vendor_id,
            worker_id: row.worker_id,
            service_id: row.service_id,
            category_id: row.category_id,
            scheduled_date: row.scheduled_date,
            final_amount: row.final_amount.map(decimal_to_f64),
            rating: row.rating,
            vendor_notes: row.vendor_notes,
            worker_notes: row.worker_notes,
            worker_payment_status: row.worker_payment_status,
            final_settlement_status: row.final_settlement_status,
            cancelled_by,
            cancellation_reason: row.cancellation_reason,
            accepted_at: row.accepted_at,
            assigned_at: row.assigned_at,
            started_at: row.started_at,
            completed_at: row.completed_at,
            cancelled_at: row.cancelled_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WorkerRow {
    id: Uuid,
    vendor_id: Uuid,
    name: String,
    phone: Option<String>,
    status: String,
    rating: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<WorkerRow> for Worker {
    fn from(row: WorkerRow) -> Self {
        Worker {
            id: row.id,
            vendor_id: row.vendor_id,
            name: row.name,
            phone: row.phone,
            status: row.status,
            rating: row.rating,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PgStore {
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO bookings (id, booking_number, status, user_id, vendor_id, worker_id,
                service_id, category_id, scheduled_date, final_amount, rating, vendor_notes,
                worker_notes, worker_payment_status, final_settlement_status, cancelled_by,
                cancellation_reason, accepted_at, assigned_at, started_at, completed_at,
                cancelled_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22, $23, $24)
            "#,
        )
        .bind(booking.id)
        .bind(&booking.booking_number)
        .bind(booking.status.as_str())
        .bind(booking.user_id)
        .bind(booking.vendor_id)
        .bind(booking.worker_id)
        .bind(booking.service_id)
        .bind(booking.category_id)
        .bind(booking.scheduled_date)
        .bind(booking.final_amount.map(f64_to_decimal))
        .bind(booking.rating)
        .bind(&booking.vendor_notes)
        .bind(&booking.worker_notes)
        .bind(&booking.worker_payment_status)
        .bind(&booking.final_settlement_status)
        .bind(booking.cancelled_by.map(CancelActor::as_str))
        .bind(&booking.cancellation_reason)
        .bind(booking.accepted_at)
        .bind(booking.assigned_at)
        .bind(booking.started_at)
        .bind(booking.completed_at)
        .bind(booking.cancelled_at)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn by_id(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Booking::try_from).transpose()
    }

    async fn owned_by_vendor(
        &self,
        id: Uuid,
        vendor_id: Uuid,
    ) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 AND vendor_id = $2"
        ))
        .bind(id)
        .bind(vendor_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Booking::try_from).transpose()
    }

    async fn visible_to_vendor(
        &self,
        id: Uuid,
        vendor_id: Uuid,
    ) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS} FROM bookings
            WHERE id = $1
              AND (vendor_id = $2
                   OR (vendor_id IS NULL AND status IN ('REQUESTED', 'SEARCHING')))
            "#
        ))
        .bind(id)
        .bind(vendor_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Booking::try_from).transpose()
    }

    async fn owned_by_worker(
        &self,
        id: Uuid,
        worker_id: Uuid,
    ) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 AND worker_id = $2"
        ))
        .bind(id)
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Booking::try_from).transpose()
    }

    async fn update(&self, booking: &Booking, guard: &WriteGuard) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                status = $2, vendor_id = $3, worker_id = $4, final_amount = $5, rating = $6,
                vendor_notes = $7, worker_notes = $8, worker_payment_status = $9,
                final_settlement_status = $10, cancelled_by = $11, cancellation_reason = $12,
                accepted_at = $13, assigned_at = $14, started_at = $15, completed_at = $16,
                cancelled_at = $17, updated_at = $18
            WHERE id = $1 AND status = $19 AND vendor_id IS NOT DISTINCT FROM $20
            "#,
        )
        .bind(booking.id)
        .bind(booking.status.as_str())
        .bind(booking.vendor_id)
        .bind(booking.worker_id)
        .bind(booking.final_amount.map(f64_to_decimal))
        .bind(booking.rating)
        .bind(&booking.vendor_notes)
        .bind(&booking.worker_notes)
        .bind(&booking.worker_payment_status)
        .bind(&booking.final_settlement_status)
        .bind(booking.cancelled_by.map(CancelActor::as_str))
        .bind(&booking.cancellation_reason)
        .bind(booking.accepted_at)
        .bind(booking.assigned_at)
        .bind(booking.started_at)
        .bind(booking.completed_at)
        .bind(booking.cancelled_at)
        .bind(booking.updated_at)
        .bind(guard.status.as_str())
        .bind(guard.vendor_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_vendor_notes(
        &self,
        id: Uuid,
        vendor_id: Uuid,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            UPDATE bookings SET vendor_notes = $3, updated_at = $4
            WHERE id = $1 AND vendor_id = $2
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(vendor_id)
        .bind(notes)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Booking::try_from).transpose()
    }

    async fn set_worker_notes(
        &self,
        id: Uuid,
        worker_id: Uuid,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            UPDATE bookings SET worker_notes = $3, updated_at = $4
            WHERE id = $1 AND worker_id = $2
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(worker_id)
        .bind(notes)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Booking::try_from).transpose()
    }

    async fn set_settlement(
        &self,
        id: Uuid,
        vendor_id: Uuid,
        worker_payment_status: Option<&str>,
        final_settlement_status: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            UPDATE bookings SET
                worker_payment_status = COALESCE($3, worker_payment_status),
                final_settlement_status = COALESCE($4, final_settlement_status),
                updated_at = $5
            WHERE id = $1 AND vendor_id = $2
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(vendor_id)
        .bind(worker_payment_status)
        .bind(final_settlement_status)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Booking::try_from).transpose()
    }

    async fn list_for_vendor(
        &self,
        vendor_id: Uuid,
        filter: &VendorBookingFilter,
        page: &PageRequest,
    ) -> Result<BookingPage, StoreError> {
        let status = filter.status.map(BookingStatus::as_str);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM bookings
            WHERE ((vendor_id = $1 AND status <> 'AWAITING_PAYMENT')
                   OR (vendor_id IS NULL AND status IN ('REQUESTED', 'SEARCHING')))
              AND ($2::text IS NULL OR status = $2)
              AND ($3::timestamptz IS NULL OR scheduled_date >= $3)
              AND ($4::timestamptz IS NULL OR scheduled_date <= $4)
            "#,
        )
        .bind(vendor_id)
        .bind(status)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS} FROM bookings
            WHERE ((vendor_id = $1 AND status <> 'AWAITING_PAYMENT')
                   OR (vendor_id IS NULL AND status IN ('REQUESTED', 'SEARCHING')))
              AND ($2::text IS NULL OR status = $2)
              AND ($3::timestamptz IS NULL OR scheduled_date >= $3)
              AND ($4::timestamptz IS NULL OR scheduled_date <= $4)
            ORDER BY created_at DESC
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(vendor_id)
        .bind(status)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(page.limit as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(Booking::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BookingPage {
            items,
            total: total as u64,
        })
    }

    async fn list_for_worker(
        &self,
        worker_id: Uuid,
        filter: &WorkerJobFilter,
        page: &PageRequest,
    ) -> Result<BookingPage, StoreError> {
        let status = filter.status.map(BookingStatus::as_str);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM bookings
            WHERE worker_id = $1 AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(worker_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS} FROM bookings
            WHERE worker_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY scheduled_date ASC, created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(worker_id)
        .bind(status)
        .bind(page.limit as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(Booking::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BookingPage {
            items,
            total: total as u64,
        })
    }

    async fn all_for_worker(&self, worker_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS} FROM bookings
            WHERE worker_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(worker_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Booking::try_from).collect()
    }
}

#[async_trait]
impl WorkerStore for PgStore {
    async fn insert_worker(&self, worker: &Worker) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO workers (id, vendor_id, name, phone, status, rating, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(worker.id)
        .bind(worker.vendor_id)
        .bind(&worker.name)
        .bind(&worker.phone)
        .bind(&worker.status)
        .bind(worker.rating)
        .bind(worker.created_at)
        .bind(worker.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn worker_by_id(&self, id: Uuid) -> Result<Option<Worker>, StoreError> {
        let row = sqlx::query_as::<_, WorkerRow>(
            "SELECT id, vendor_id, name, phone, status, rating, created_at, updated_at \
             FROM workers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Worker::from))
    }

    async fn worker_for_vendor(
        &self,
        id: Uuid,
        vendor_id: Uuid,
    ) -> Result<Option<Worker>, StoreError> {
        let row = sqlx::query_as::<_, WorkerRow>(
            "SELECT id, vendor_id, name, phone, status, rating, created_at, updated_at \
             FROM workers WHERE id = $1 AND vendor_id = $2",
        )
        .bind(id)
        .bind(vendor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Worker::from))
    }
}
