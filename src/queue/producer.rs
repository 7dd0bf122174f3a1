//! Enqueue side.
//!
//! Producers live outside the consumption core (the API service enqueues,
//! this worker consumes) but share the envelope attribute schema, so both
//! directions are kept in one place.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::client::QueueClient;
use super::envelope::{JOB_ID_ATTRIBUTE, ROUTE_ATTRIBUTE};
use super::errors::QueueError;

/// Enqueues events with the routing attributes the consumer expects.
pub struct Producer {
    client: Arc<dyn QueueClient>,
    route: String,
}

impl Producer {
    pub fn new(client: Arc<dyn QueueClient>, route: impl Into<String>) -> Self {
        Self {
            client,
            route: route.into(),
        }
    }

    /// Serializes the event and sends it with the `route` attribute and a
    /// generated `id` attribute. Returns the queue-assigned message id.
    pub async fn enqueue<T: Serialize + Sync>(&self, event: &T) -> Result<String, QueueError> {
        let body = serde_json::to_string(event)
            .map_err(|e| QueueError::SerializationError(e.to_string()))?;

        let job_id = Uuid::new_v4().to_string();
        let attributes = HashMap::from([
            (ROUTE_ATTRIBUTE.to_string(), self.route.clone()),
            (JOB_ID_ATTRIBUTE.to_string(), job_id.clone()),
        ]);

        let message_id = self.client.send(body, attributes).await?;
        debug!(
            route = %self.route,
            job_id = %job_id,
            message_id = %message_id,
            "Enqueued event"
        );
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::client::MockQueueClient;

    #[derive(Serialize)]
    struct TestEvent {
        x: u32,
    }

    struct Broken;

    impl Serialize for Broken {
        fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            Err(serde::ser::Error::custom("not serializable"))
        }
    }

    #[tokio::test]
    async fn test_enqueue_stamps_route_and_id_attributes() {
        let mut client = MockQueueClient::new();
        client
            .expect_send()
            .withf(|body, attributes| {
                body == r#"{"x":1}"#
                    && attributes.get(ROUTE_ATTRIBUTE).map(String::as_str) == Some("user-activity")
                    && attributes.contains_key(JOB_ID_ATTRIBUTE)
            })
            .times(1)
            .returning(|_, _| Box::pin(async { Ok("m-1".to_string()) }));

        let producer = Producer::new(Arc::new(client), "user-activity");
        let message_id = producer.enqueue(&TestEvent { x: 1 }).await.unwrap();

        assert_eq!(message_id, "m-1");
    }

    #[tokio::test]
    async fn test_enqueue_surfaces_serialization_failure() {
        let mut client = MockQueueClient::new();
        client.expect_send().times(0);

        let producer = Producer::new(Arc::new(client), "user-activity");
        let result = producer.enqueue(&Broken).await;

        assert!(matches!(result, Err(QueueError::SerializationError(_))));
    }
}
