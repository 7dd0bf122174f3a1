//! Route handlers for the worker binary.

use eyre::WrapErr;
use tracing::info;

use crate::events::UserActivityEvent;
use crate::queue::{handler_fn, DynHandler, Envelope, HandlerResult};

/// Route key for user-activity events.
pub const USER_ACTIVITY_ROUTE: &str = "user-activity";

/// Builds the user-activity handler: decode, validate, record.
///
/// Idempotent under at-least-once redelivery: recording the same event twice
/// produces two identical log lines and nothing else.
pub fn user_activity_handler() -> DynHandler {
    handler_fn(|envelope: Envelope| async move { record_user_activity(&envelope).await })
}

async fn record_user_activity(envelope: &Envelope) -> HandlerResult {
    let event: UserActivityEvent = serde_json::from_str(&envelope.body)
        .wrap_err_with(|| format!("Failed to decode user-activity event {}", envelope.job_id()))?;

    if event.user_id.is_empty() {
        eyre::bail!(
            "user-activity event {} has an empty userId",
            envelope.job_id()
        );
    }

    info!(
        user_id = %event.user_id,
        event_type = %event.event_type,
        event_time = %event.event_time,
        details = %event.details,
        "Recorded user activity"
    );
    Ok(())
}
