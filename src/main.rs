//! Worker binary entry point.

use std::sync::Arc;

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use dotenvy::dotenv;
use tracing::info;

use activity_worker::config::AppConfig;
use activity_worker::handlers::{user_activity_handler, USER_ACTIVITY_ROUTE};
use activity_worker::logging::setup_logging;
use activity_worker::queue::{
    listen_for_termination, RequestTiming, Router, SqsQueueClient, Worker,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    color_eyre::install()?;
    setup_logging();

    let config = AppConfig::from_env();

    // Middleware first; the router locks the chain once a handler exists.
    let mut router = Router::default();
    router.use_middleware(RequestTiming);
    router.add_handler(USER_ACTIVITY_ROUTE, user_activity_handler());

    let aws_config = aws_config::load_from_env().await;
    let client = Arc::new(SqsQueueClient::new(&aws_config, config.queue_url.clone()));

    info!(queue_url = %config.queue_url, "Starting user-activity worker");

    let worker = Worker::new(client, config.worker, router);
    listen_for_termination(worker.stop_handle());

    worker
        .run()
        .await
        .wrap_err("Worker terminated with a fatal queue error")
}
