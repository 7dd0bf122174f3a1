//! Message-queue consumption core.
//!
//! A long-polling worker pulls messages from a durable at-least-once queue,
//! dispatches each to a handler selected by a routing key, and settles every
//! attempt through an escalating-backoff retry policy driven by the queue's
//! redelivery count.
//!
//! # Example
//!
//! ```ignore
//! let aws_config = aws_config::load_from_env().await;
//! let client = Arc::new(SqsQueueClient::new(&aws_config, queue_url));
//!
//! let mut router = Router::default();
//! router.use_middleware(RequestTiming);
//! router.add_handler("user-activity", handler_fn(my_handler));
//!
//! let worker = Worker::new(client, WorkerConfig::default(), router);
//! listen_for_termination(worker.stop_handle());
//! worker.run().await?;
//! ```

pub mod client;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod middleware;
pub mod producer;
pub mod retry;
pub mod router;
pub mod shutdown;
pub mod worker;

pub use client::{QueueClient, SqsQueueClient};
pub use config::WorkerConfig;
pub use envelope::{Envelope, JOB_ID_ATTRIBUTE, ROUTE_ATTRIBUTE};
pub use errors::{QueueError, WorkerError};
pub use middleware::RequestTiming;
pub use producer::Producer;
pub use router::{
    handler_fn, AttributeRouteExtractor, DynHandler, Handler, HandlerResult, Middleware,
    RouteExtractor, Router,
};
pub use shutdown::listen_for_termination;
pub use worker::{StopHandle, Worker};
