//! Message routing.
//!
//! Maps a routing key extracted from an [`Envelope`] to a registered handler,
//! wrapping it in the configured middleware chain. Routing happens on a
//! message attribute rather than the body, so heterogeneous event payloads
//! can share one queue.
//!
//! Registration is a startup-time activity: all middleware must be registered
//! before the first handler so every handler is wrapped uniformly, and the
//! router is read-only once the worker starts.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::envelope::Envelope;

/// Outcome of handling one message. A non-`Ok` result hands the message back
/// to the queue for redelivery.
pub type HandlerResult = eyre::Result<()>;

/// Shared handler, as stored in the router and produced by middleware.
pub type DynHandler = Arc<dyn Handler>;

/// A message handler.
///
/// Handlers must be idempotent: the queue is at-least-once and a message may
/// be redelivered after a crash or visibility-timeout expiry.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, envelope: &Envelope) -> HandlerResult;
}

struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Envelope) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    async fn handle(&self, envelope: &Envelope) -> HandlerResult {
        (self.0)(envelope.clone()).await
    }
}

/// Adapts an async closure into a [`DynHandler`].
pub fn handler_fn<F, Fut>(f: F) -> DynHandler
where
    F: Fn(Envelope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// Decorator wrapping a handler with cross-cutting behavior.
///
/// Middleware compose onion-style: the chain is built by folding the
/// registered list in order, so the last-registered middleware becomes the
/// outermost wrapper and the first-registered one runs closest to the handler.
pub trait Middleware: Send + Sync {
    fn wrap(&self, next: DynHandler) -> DynHandler;
}

/// Strategy extracting the routing key from an envelope.
pub trait RouteExtractor: Send + Sync {
    fn route(&self, envelope: &Envelope) -> String;
}

/// Stock extractor reading the `route` message attribute; returns `""` when
/// the attribute is absent, which falls through to the not-found policy.
#[derive(Debug, Default)]
pub struct AttributeRouteExtractor;

impl RouteExtractor for AttributeRouteExtractor {
    fn route(&self, envelope: &Envelope) -> String {
        envelope.route().to_string()
    }
}

/// Routes envelopes to handlers through the middleware chain.
pub struct Router {
    extractor: Box<dyn RouteExtractor>,
    middlewares: Vec<Arc<dyn Middleware>>,
    handlers: HashMap<String, DynHandler>,
}

impl Router {
    pub fn new(extractor: impl RouteExtractor + 'static) -> Self {
        Self {
            extractor: Box::new(extractor),
            middlewares: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    /// Registers a handler for an exact route key. Re-registering a route
    /// replaces the previous handler (last write wins).
    pub fn add_handler(&mut self, route: impl Into<String>, handler: DynHandler) {
        self.handlers.insert(route.into(), handler);
    }

    /// Appends a middleware to the chain.
    ///
    /// # Panics
    /// Panics if any handler has already been registered. Interleaving would
    /// let some handlers silently bypass some middleware, so this is treated
    /// as a programming error that aborts startup.
    pub fn use_middleware(&mut self, middleware: impl Middleware + 'static) {
        assert!(
            self.handlers.is_empty(),
            "message router: all middleware must be registered before adding any handler"
        );
        self.middlewares.push(Arc::new(middleware));
    }

    /// Resolves the envelope's route and invokes the wrapped handler.
    ///
    /// An unroutable message is logged and reported as handled, so it will
    /// be deleted from the queue rather than requeued. This mirrors the
    /// upstream contract and is pending product-owner confirmation (see
    /// DESIGN.md); do not "fix" it locally.
    pub async fn handle(&self, envelope: &Envelope) -> HandlerResult {
        let route = self.extractor.route(envelope);

        let Some(handler) = self.handlers.get(&route) else {
            info!(route = %route, "No handler registered for route, treating message as handled");
            return Ok(());
        };

        let mut wrapped = handler.clone();
        for middleware in &self.middlewares {
            wrapped = middleware.wrap(wrapped);
        }

        wrapped.handle(envelope).await
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(AttributeRouteExtractor)
    }
}
