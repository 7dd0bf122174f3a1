//! Stock middleware.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::info;

use super::envelope::Envelope;
use super::router::{DynHandler, Handler, HandlerResult, Middleware};

/// Logs route, job id and elapsed time around every handled message.
///
/// Register before any handler so the whole route table is covered.
#[derive(Debug, Default)]
pub struct RequestTiming;

struct TimedHandler {
    next: DynHandler,
}

impl Middleware for RequestTiming {
    fn wrap(&self, next: DynHandler) -> DynHandler {
        Arc::new(TimedHandler { next })
    }
}

#[async_trait]
impl Handler for TimedHandler {
    async fn handle(&self, envelope: &Envelope) -> HandlerResult {
        let started = Instant::now();
        let result = self.next.handle(envelope).await;
        info!(
            route = %envelope.route(),
            job_id = %envelope.job_id(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            success = result.is_ok(),
            "Handled message"
        );
        result
    }
}
