//! Redelivery classification and escalating backoff.
//!
//! The queue's only failure signal is "redelivered N times", so the policy is
//! driven entirely by the handling outcome and the envelope's receive count:
//! acknowledge on success, otherwise hand the message back with a visibility
//! timeout that grows linearly with the attempt number.

use tracing::info;

use super::client::QueueClient;
use super::config::WorkerConfig;
use super::envelope::Envelope;
use super::router::HandlerResult;

/// SQS maximum visibility timeout (12 hours).
const MAX_VISIBILITY_TIMEOUT_SECS: i64 = 43_200;
/// Floor for the backoff base, so small configured timeouts do not thrash.
const MIN_BACKOFF_BASE_SECS: i64 = 60;

/// Decides whether a handled message is acknowledged or requeued with an
/// extended visibility timeout.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    visibility_timeout_secs: i32,
}

impl RetryPolicy {
    pub fn new(config: &WorkerConfig) -> Self {
        Self {
            visibility_timeout_secs: config.visibility_timeout_secs,
        }
    }

    /// Classifies a handling outcome; returns `(success, receive_count)`.
    ///
    /// On failure with a known redelivery count, the message's visibility
    /// timeout is extended to [`backoff_timeout_secs`]. A message without a
    /// usable receive count is failed without extension, since no safe
    /// timeout can be computed for it. Extension failures are logged and
    /// otherwise ignored; the message still reappears at its original
    /// timeout, a soft degradation rather than a hard failure.
    pub async fn resolve(
        &self,
        client: &dyn QueueClient,
        outcome: &HandlerResult,
        envelope: &Envelope,
    ) -> (bool, u32) {
        if outcome.is_ok() {
            return (true, 0);
        }

        let Some(receive_count) = envelope.receive_count else {
            info!(
                job_id = %envelope.job_id(),
                "Message carries no usable receive count, skipping visibility extension"
            );
            return (false, 0);
        };

        let timeout_secs = backoff_timeout_secs(self.visibility_timeout_secs, receive_count);
        if let Err(e) = client
            .extend_visibility(&envelope.receipt_token, timeout_secs)
            .await
        {
            info!(
                job_id = %envelope.job_id(),
                error = %e,
                "Could not extend message visibility timeout"
            );
        }

        (false, receive_count)
    }
}

/// Escalating visibility timeout: linear in the redelivery count, with the
/// base floored at 60s and the result capped at the SQS maximum.
pub fn backoff_timeout_secs(visibility_timeout_secs: i32, receive_count: u32) -> i32 {
    let base = i64::from(visibility_timeout_secs).max(MIN_BACKOFF_BASE_SECS);
    (base * i64::from(receive_count)).min(MAX_VISIBILITY_TIMEOUT_SECS) as i32
}

/// Whether a failure at this redelivery count is surfaced at error severity.
///
/// Every third attempt escalates; the first couple of retries stay quiet at
/// info so transient flakes do not page anyone.
pub fn escalates(receive_count: u32) -> bool {
    receive_count % 3 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::client::MockQueueClient;
    use crate::queue::errors::QueueError;
    use std::collections::HashMap;

    fn envelope_with_count(receive_count: Option<u32>) -> Envelope {
        Envelope {
            message_id: "m-1".to_string(),
            body: "{}".to_string(),
            attributes: HashMap::new(),
            receipt_token: "rt-1".to_string(),
            receive_count,
        }
    }

    fn policy(visibility_timeout_secs: i32) -> RetryPolicy {
        RetryPolicy::new(&WorkerConfig {
            max_messages: 1,
            visibility_timeout_secs,
            wait_time_secs: 10,
            nack_visibility_timeout_secs: 300,
        })
    }

    #[test]
    fn test_backoff_formula_and_monotonicity() {
        let mut previous = 0;
        for count in 1..=3 {
            let timeout = backoff_timeout_secs(300, count);
            assert_eq!(timeout, 300 * count as i32);
            assert!(timeout >= previous);
            previous = timeout;
        }
    }

    #[test]
    fn test_backoff_floors_small_timeouts_at_sixty() {
        assert_eq!(backoff_timeout_secs(5, 1), 60);
        assert_eq!(backoff_timeout_secs(5, 2), 120);
        assert_eq!(backoff_timeout_secs(0, 3), 180);
    }

    #[test]
    fn test_backoff_caps_at_sqs_maximum() {
        assert_eq!(backoff_timeout_secs(300, 200), 43_200);
    }

    #[test]
    fn test_escalates_every_third_attempt() {
        for count in [3, 6, 9] {
            assert!(escalates(count), "count {count} should escalate");
        }
        for count in [1, 2, 4, 5] {
            assert!(!escalates(count), "count {count} should stay quiet");
        }
        // The parse-failure sentinel surfaces loudly as well.
        assert!(escalates(0));
    }

    #[tokio::test]
    async fn test_resolve_success_skips_queue_calls() {
        let mut client = MockQueueClient::new();
        client.expect_extend_visibility().times(0);

        let outcome: HandlerResult = Ok(());
        let (success, count) = policy(300)
            .resolve(&client, &outcome, &envelope_with_count(Some(2)))
            .await;

        assert!(success);
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_resolve_failure_extends_visibility() {
        let mut client = MockQueueClient::new();
        client
            .expect_extend_visibility()
            .withf(|token, timeout| token == "rt-1" && *timeout == 600)
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let outcome: HandlerResult = Err(eyre::eyre!("boom"));
        let (success, count) = policy(300)
            .resolve(&client, &outcome, &envelope_with_count(Some(2)))
            .await;

        assert!(!success);
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_resolve_missing_count_skips_extension() {
        let mut client = MockQueueClient::new();
        client.expect_extend_visibility().times(0);

        let outcome: HandlerResult = Err(eyre::eyre!("boom"));
        let (success, count) = policy(300)
            .resolve(&client, &outcome, &envelope_with_count(None))
            .await;

        assert!(!success);
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_resolve_extension_failure_is_soft() {
        let mut client = MockQueueClient::new();
        client
            .expect_extend_visibility()
            .times(1)
            .returning(|_, _| {
                Box::pin(async { Err(QueueError::SqsError("stale receipt".to_string())) })
            });

        let outcome: HandlerResult = Err(eyre::eyre!("boom"));
        let (success, count) = policy(300)
            .resolve(&client, &outcome, &envelope_with_count(Some(1)))
            .await;

        assert!(!success);
        assert_eq!(count, 1);
    }
}
