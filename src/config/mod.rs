use std::env;

use crate::queue::WorkerConfig;

/// Process configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// URL of the queue this worker consumes.
    pub queue_url: String,
    pub worker: WorkerConfig,
}

impl AppConfig {
    /// Reads configuration from the environment.
    ///
    /// `SQS_QUEUE_URL` is required. The worker knobs are optional; unset or
    /// unparsable values resolve to the worker defaults.
    pub fn from_env() -> Self {
        Self {
            queue_url: env::var("SQS_QUEUE_URL").expect("SQS_QUEUE_URL must be set"),
            worker: WorkerConfig {
                max_messages: env_i32("WORKER_MAX_MESSAGES"),
                visibility_timeout_secs: env_i32("WORKER_VISIBILITY_TIMEOUT_SECS"),
                wait_time_secs: env_i32("WORKER_WAIT_TIME_SECS"),
                nack_visibility_timeout_secs: env_i32("WORKER_NACK_VISIBILITY_TIMEOUT_SECS"),
            },
        }
    }
}

// Zero means "use the default"; WorkerConfig::apply_defaults resolves it.
fn env_i32(name: &str) -> i32 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}
