//! Notification dispatch.
//!
//! The lifecycle engine calls [`Notifier::notify`] after a transition has
//! committed. Dispatch is best-effort observability: a failure is logged by
//! the caller and never rolls back the transition.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::notifications::{BookingNotification, NotifyTarget};

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        target: NotifyTarget,
        notification: BookingNotification,
    ) -> anyhow::Result<()>;
}

/// Persists notifications to the `notifications` table, where the delivery
/// layer (out of process) picks them up.
#[derive(Clone)]
pub struct PgNotifier {
    pool: PgPool,
}

impl PgNotifier {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Notifier for PgNotifier {
    async fn notify(
        &self,
        target: NotifyTarget,
        notification: BookingNotification,
    ) -> anyhow::Result<()> {
        let id = Uuid::new_v4();
        let (recipient_type, recipient_id) = target.recipient();

        sqlx::query(
            r#"
            INSERT INTO notifications (id, recipient_type, recipient_id, kind, title, message, booking_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(recipient_type)
        .bind(recipient_id)
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.booking_id)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            notification_id = %id,
            recipient_type,
            recipient_id = %recipient_id,
            kind = %notification.kind,
            booking_id = %notification.booking_id,
            "Notification created"
        );

        Ok(())
    }
}

/// Discards every notification. Useful where dispatch is irrelevant.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(
        &self,
        _target: NotifyTarget,
        _notification: BookingNotification,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}
