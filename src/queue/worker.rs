//! Batch consumer loop.
//!
//! The worker long-polls the queue, fans out one task per received message
//! (bounded by the batch size), and joins the whole batch before polling
//! again. Batches are strictly sequential: if the process dies mid-batch, the
//! number of messages that can be reprocessed after their visibility timeout
//! expires is capped at `max_messages`, not unbounded.
//!
//! Shutdown is cooperative and prompt rather than drain-to-completion: the
//! stop flag is observed once per iteration, immediately after a receive
//! returns, and a batch pulled by that last receive is abandoned back to the
//! queue.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use super::client::QueueClient;
use super::config::WorkerConfig;
use super::envelope::Envelope;
use super::errors::WorkerError;
use super::retry::{escalates, RetryPolicy};
use super::router::Router;

/// Requests a graceful stop of the consumer loop.
///
/// Cloneable and cheap; hand one to the signal listener. Setting the flag is
/// idempotent, never cancels in-flight tasks, and never touches the queue
/// connection.
#[derive(Debug, Clone)]
pub struct StopHandle {
    stopping: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.stopping.store(true, Ordering::SeqCst);
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }
}

/// Long-polling queue consumer.
pub struct Worker {
    client: Arc<dyn QueueClient>,
    config: WorkerConfig,
    router: Arc<Router>,
    policy: RetryPolicy,
    stopping: Arc<AtomicBool>,
}

impl Worker {
    /// Builds a worker over a queue client and a fully wired router.
    /// Zero-valued config fields are replaced with their defaults.
    pub fn new(client: Arc<dyn QueueClient>, mut config: WorkerConfig, router: Router) -> Self {
        config.apply_defaults();
        let policy = RetryPolicy::new(&config);
        Self {
            client,
            config,
            router: Arc::new(router),
            policy,
            stopping: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            stopping: self.stopping.clone(),
        }
    }

    /// Runs the consumer loop until stopped or fatally errored.
    ///
    /// A receive failure terminates the loop and is returned to the caller;
    /// receive is not retried internally, the process supervisor decides
    /// whether to restart.
    pub async fn run(&self) -> Result<(), WorkerError> {
        info!(
            max_messages = self.config.max_messages,
            visibility_timeout_secs = self.config.visibility_timeout_secs,
            wait_time_secs = self.config.wait_time_secs,
            "Worker is now running"
        );

        loop {
            let envelopes = self
                .client
                .receive(
                    self.config.max_messages,
                    self.config.visibility_timeout_secs,
                    self.config.wait_time_secs,
                )
                .await
                .map_err(WorkerError::Receive)?;

            // Observed after the receive returns: a batch pulled by this last
            // poll is abandoned and becomes visible again once its visibility
            // timeout elapses.
            if self.stopping.load(Ordering::SeqCst) {
                info!("Stop requested, exiting consumer loop");
                return Ok(());
            }

            if envelopes.is_empty() {
                continue;
            }

            debug!(message_count = envelopes.len(), "Received messages");

            let mut batch = JoinSet::new();
            for envelope in envelopes {
                let client = self.client.clone();
                let router = self.router.clone();
                let policy = self.policy.clone();
                batch.spawn(async move {
                    let job_id = envelope.job_id().to_string();
                    let route = envelope.route().to_string();

                    let task = process_message(client, router, policy, &envelope);
                    if let Err(panic) = AssertUnwindSafe(task).catch_unwind().await {
                        let payload = panic
                            .downcast_ref::<String>()
                            .map(|s| s.as_str())
                            .or_else(|| panic.downcast_ref::<&str>().copied())
                            .unwrap_or("unknown panic");
                        error!(
                            job_id = %job_id,
                            route = %route,
                            panic = %payload,
                            "Unrecovered fault in message task, terminating worker process"
                        );
                        // Fail fast: an unknown state in one handler is more
                        // dangerous than downtime. The queue redelivers the
                        // message to a fresh process instance.
                        std::process::exit(1);
                    }
                });
            }

            // Fan-in: batch N+1 never starts before batch N fully completes.
            while let Some(joined) = batch.join_next().await {
                if let Err(e) = joined {
                    error!(error = %e, "Message task torn down in unknown state, terminating worker process");
                    std::process::exit(1);
                }
            }
        }
    }
}

/// Processes one received message end to end: dispatch, classify, settle.
async fn process_message(
    client: Arc<dyn QueueClient>,
    router: Arc<Router>,
    policy: RetryPolicy,
    envelope: &Envelope,
) {
    let job_id = envelope.job_id().to_string();
    info!(job_id = %job_id, "Processing job");

    let outcome = router.handle(envelope).await;
    let (success, receive_count) = policy.resolve(client.as_ref(), &outcome, envelope).await;

    if !success {
        // The `{:#}` chain keeps the wrapped context so operators can trace
        // which message/route/attempt failed.
        let cause = outcome
            .err()
            .map(|e| format!("{e:#}"))
            .unwrap_or_default();
        if escalates(receive_count) {
            error!(
                job_id = %job_id,
                receive_count = receive_count,
                error = %cause,
                "Job failed"
            );
        } else {
            info!(
                job_id = %job_id,
                receive_count = receive_count,
                error = %cause,
                "Job failed, will retry after visibility timeout"
            );
        }
        return;
    }

    if let Err(e) = client.delete(&envelope.receipt_token).await {
        // Non-fatal: the message reappears after its visibility timeout and
        // is reprocessed, a log-visible duplicate-processing risk.
        error!(job_id = %job_id, error = %e, "Failed to delete message from queue");
        return;
    }

    info!(job_id = %job_id, "Finished processing job");
}
