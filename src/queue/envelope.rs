//! Received-message envelope.
//!
//! An [`Envelope`] is the immutable view of one queue item for the lifetime of
//! a single processing attempt. The transport produces it on receive; it is
//! discarded once the message is deleted or handed back to the queue.

use std::collections::HashMap;

/// Message attribute carrying the routing key.
pub const ROUTE_ATTRIBUTE: &str = "route";

/// Optional message attribute carrying a caller-assigned job identifier,
/// used for log correlation instead of the queue-assigned message id.
pub const JOB_ID_ATTRIBUTE: &str = "id";

/// One received queue message.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Queue-assigned message id.
    pub message_id: String,
    /// Opaque message body (JSON for all producers in this system).
    pub body: String,
    /// Message attributes (string values), including [`ROUTE_ATTRIBUTE`]
    /// and [`JOB_ID_ATTRIBUTE`] when the producer set them.
    pub attributes: HashMap<String, String>,
    /// Receipt token scoping delete/extend-visibility calls to this delivery.
    pub receipt_token: String,
    /// The queue's `ApproximateReceiveCount` system attribute. `None` when
    /// the attribute was missing or unparsable; the retry policy owns that
    /// failure mode.
    pub receive_count: Option<u32>,
}

impl Envelope {
    /// Returns the value of a message attribute, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Returns the routing key attribute, or `""` when absent.
    ///
    /// The empty string falls through to the router's not-found policy.
    pub fn route(&self) -> &str {
        self.attribute(ROUTE_ATTRIBUTE).unwrap_or_default()
    }

    /// Display identifier for logs: the producer-assigned `id` attribute when
    /// present, else the queue-assigned message id.
    pub fn job_id(&self) -> &str {
        self.attribute(JOB_ID_ATTRIBUTE).unwrap_or(&self.message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope_with_attributes(attributes: HashMap<String, String>) -> Envelope {
        Envelope {
            message_id: "m-1".to_string(),
            body: "{}".to_string(),
            attributes,
            receipt_token: "rt-1".to_string(),
            receive_count: Some(1),
        }
    }

    #[test]
    fn test_route_defaults_to_empty() {
        let envelope = envelope_with_attributes(HashMap::new());
        assert_eq!(envelope.route(), "");
    }

    #[test]
    fn test_route_reads_attribute() {
        let envelope = envelope_with_attributes(HashMap::from([(
            ROUTE_ATTRIBUTE.to_string(),
            "user-activity".to_string(),
        )]));
        assert_eq!(envelope.route(), "user-activity");
    }

    #[test]
    fn test_job_id_prefers_id_attribute() {
        let envelope = envelope_with_attributes(HashMap::from([(
            JOB_ID_ATTRIBUTE.to_string(),
            "job-42".to_string(),
        )]));
        assert_eq!(envelope.job_id(), "job-42");
    }

    #[test]
    fn test_job_id_falls_back_to_message_id() {
        let envelope = envelope_with_attributes(HashMap::new());
        assert_eq!(envelope.job_id(), "m-1");
    }
}
