//! # activity-worker
//!
//! SQS consumer for user-activity events.
//!
//! The crate is split between a reusable consumption core ([`queue`]) and the
//! worker's own domain ([`events`], [`handlers`]):
//!
//! ```text
//! Worker (batch consumer loop, stop flag, crash containment)
//!   ├── QueueClient (receive / delete / extend-visibility / send, SQS-backed)
//!   ├── Router (route attribute → middleware chain → handler)
//!   └── RetryPolicy (redelivery count → escalating visibility backoff)
//! ```
//!
//! Delivery is at-least-once; handlers must be idempotent. See the [`queue`]
//! module for the consumption contract.

pub mod config;
pub mod events;
pub mod handlers;
pub mod logging;
pub mod queue;

pub use config::AppConfig;
pub use queue::{
    handler_fn, Envelope, Handler, HandlerResult, Middleware, Producer, QueueClient, QueueError,
    Router, SqsQueueClient, StopHandle, Worker, WorkerConfig, WorkerError,
};
