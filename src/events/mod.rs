//! Event payloads shared with upstream producers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-activity event, as enqueued by the API service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivityEvent {
    pub user_id: String,
    pub event_type: String,
    pub event_time: DateTime<Utc>,
    pub details: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_round_trip() {
        let wire = r#"{"userId":"u-1","eventType":"signin","eventTime":"2025-03-01T10:00:00Z","details":"ok"}"#;
        let event: UserActivityEvent = serde_json::from_str(wire).unwrap();

        assert_eq!(event.user_id, "u-1");
        assert_eq!(event.event_type, "signin");
        assert_eq!(event.details, "ok");

        let encoded = serde_json::to_string(&event).unwrap();
        assert!(encoded.contains(r#""userId":"u-1""#));
        assert!(encoded.contains(r#""eventType":"signin""#));
    }
}
