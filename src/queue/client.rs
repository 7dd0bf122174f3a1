//! Queue transport seam.
//!
//! [`QueueClient`] is the narrow interface the consumption core needs from the
//! queue service: receive, delete, extend-visibility, send. [`SqsQueueClient`]
//! implements it over the AWS SDK, scoped to a single queue URL. The trait is
//! mocked with `mockall` for unit testing and injected into the worker and
//! producer.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_sqs::types::{Message, MessageAttributeValue, MessageSystemAttributeName};
use tracing::warn;

use super::envelope::Envelope;
use super::errors::QueueError;

#[cfg(test)]
use mockall::automock;

pub type QueueResult<T> = Result<T, QueueError>;

/// Operations the consumption core performs against the queue service.
///
/// Delete and extend-visibility are scoped to a receipt token and therefore
/// never contend across concurrent message tasks.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait QueueClient: Send + Sync {
    /// Long-polls the queue for up to `max_messages` messages.
    async fn receive(
        &self,
        max_messages: i32,
        visibility_timeout_secs: i32,
        wait_time_secs: i32,
    ) -> QueueResult<Vec<Envelope>>;

    /// Deletes (acknowledges) a received message.
    async fn delete<'a, 'b>(&'a self, receipt_token: &'b str) -> QueueResult<()>;

    /// Resets the visibility timeout of a received message.
    async fn extend_visibility<'a, 'b>(
        &'a self,
        receipt_token: &'b str,
        timeout_secs: i32,
    ) -> QueueResult<()>;

    /// Enqueues a message with the given attributes. Returns the
    /// queue-assigned message id.
    async fn send(
        &self,
        body: String,
        attributes: HashMap<String, String>,
    ) -> QueueResult<String>;
}

/// AWS SQS implementation of [`QueueClient`], scoped to one queue.
#[derive(Debug, Clone)]
pub struct SqsQueueClient {
    client: aws_sdk_sqs::Client,
    queue_url: String,
}

impl SqsQueueClient {
    pub fn new(config: &aws_config::SdkConfig, queue_url: impl Into<String>) -> Self {
        Self {
            client: aws_sdk_sqs::Client::new(config),
            queue_url: queue_url.into(),
        }
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }
}

#[async_trait]
impl QueueClient for SqsQueueClient {
    async fn receive(
        &self,
        max_messages: i32,
        visibility_timeout_secs: i32,
        wait_time_secs: i32,
    ) -> QueueResult<Vec<Envelope>> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max_messages) // SQS max is 10
            .visibility_timeout(visibility_timeout_secs)
            .wait_time_seconds(wait_time_secs) // Long polling
            .message_system_attribute_names(MessageSystemAttributeName::ApproximateReceiveCount)
            .message_attribute_names("All")
            .send()
            .await
            .map_err(|e| QueueError::SqsError(format!("ReceiveMessage failed: {e}")))?;

        Ok(output
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(envelope_from_message)
            .collect())
    }

    async fn delete<'a, 'b>(&'a self, receipt_token: &'b str) -> QueueResult<()> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_token)
            .send()
            .await
            .map_err(|e| QueueError::SqsError(format!("DeleteMessage failed: {e}")))?;
        Ok(())
    }

    async fn extend_visibility<'a, 'b>(
        &'a self,
        receipt_token: &'b str,
        timeout_secs: i32,
    ) -> QueueResult<()> {
        self.client
            .change_message_visibility()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_token)
            .visibility_timeout(timeout_secs)
            .send()
            .await
            .map_err(|e| QueueError::SqsError(format!("ChangeMessageVisibility failed: {e}")))?;
        Ok(())
    }

    async fn send(
        &self,
        body: String,
        attributes: HashMap<String, String>,
    ) -> QueueResult<String> {
        let mut request = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body);

        for (name, value) in attributes {
            let attribute = MessageAttributeValue::builder()
                .data_type("String")
                .string_value(value)
                .build()
                .map_err(|e| {
                    QueueError::SqsError(format!("Failed to build message attribute {name}: {e}"))
                })?;
            request = request.message_attributes(name, attribute);
        }

        let output = request
            .send()
            .await
            .map_err(|e| QueueError::SqsError(format!("SendMessage failed: {e}")))?;

        Ok(output.message_id().unwrap_or_default().to_string())
    }
}

/// Converts a received SQS message into an [`Envelope`].
///
/// A message without a receipt handle cannot be acknowledged or extended;
/// it is dropped here and redelivered once its visibility timeout expires.
fn envelope_from_message(message: Message) -> Option<Envelope> {
    let message_id = message.message_id().unwrap_or_default().to_string();

    let Some(receipt_token) = message.receipt_handle().map(str::to_string) else {
        warn!(
            message_id = %message_id,
            "Received message without receipt handle, leaving it to the visibility timeout"
        );
        return None;
    };

    let receive_count = message
        .attributes()
        .and_then(|attrs| attrs.get(&MessageSystemAttributeName::ApproximateReceiveCount))
        .and_then(|count| count.parse::<u32>().ok());

    let attributes = message
        .message_attributes()
        .map(|attrs| {
            attrs
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .string_value()
                        .map(|v| (name.clone(), v.to_string()))
                })
                .collect()
        })
        .unwrap_or_default();

    Some(Envelope {
        message_id,
        body: message.body().unwrap_or_default().to_string(),
        attributes,
        receipt_token,
        receive_count,
    })
}
