//! Consumer tuning knobs.

/// Default batch size. Also the in-flight task bound per batch, so the
/// number of messages that can be reprocessed after a crash is capped.
const DEFAULT_MAX_MESSAGES: i32 = 1;
/// Default visibility timeout in seconds (5 minutes).
const DEFAULT_VISIBILITY_TIMEOUT_SECS: i32 = 300;
/// Default long-poll wait in seconds.
const DEFAULT_WAIT_TIME_SECS: i32 = 10;

/// Worker configuration.
///
/// Zero values mean "use the default"; [`WorkerConfig::apply_defaults`] fills
/// them in before the first poll. `max_messages` doubles as the upper bound on
/// concurrent in-flight tasks per batch.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub max_messages: i32,
    pub visibility_timeout_secs: i32,
    pub wait_time_secs: i32,
    /// Visibility timeout applied when a message is handed back without
    /// redelivery metadata to compute an escalating timeout from.
    pub nack_visibility_timeout_secs: i32,
}

impl WorkerConfig {
    /// Replaces zero-valued fields with their defaults.
    pub fn apply_defaults(&mut self) {
        if self.max_messages == 0 {
            self.max_messages = DEFAULT_MAX_MESSAGES;
        }
        if self.visibility_timeout_secs == 0 {
            self.visibility_timeout_secs = DEFAULT_VISIBILITY_TIMEOUT_SECS;
        }
        if self.wait_time_secs == 0 {
            self.wait_time_secs = DEFAULT_WAIT_TIME_SECS;
        }
        if self.nack_visibility_timeout_secs == 0 {
            self.nack_visibility_timeout_secs = DEFAULT_VISIBILITY_TIMEOUT_SECS;
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        let mut config = Self {
            max_messages: 0,
            visibility_timeout_secs: 0,
            wait_time_secs: 0,
            nack_visibility_timeout_secs: 0,
        };
        config.apply_defaults();
        config
    }
}
