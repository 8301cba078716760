// src/server/handler.rs
use hyper::{Body, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;
use tracing::warn;

use crate::proxy::Forwarder;

/// Bridges hyper connections to the forwarder. Infallible: a failed forward
/// becomes the caller-facing 502/503 response instead of an error that would
/// tear down the whole connection.
#[derive(Clone)]
pub struct RequestHandler {
    forwarder: Arc<Forwarder>,
}

impl RequestHandler {
    pub fn new(forwarder: Arc<Forwarder>) -> Self {
        Self { forwarder }
    }
}

impl Service<Request<Body>> for RequestHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let forwarder = self.forwarder.clone();
        Box::pin(async move {
            let response = match forwarder.forward(req).await {
                Ok(response) => response,
                Err(err) => {
                    warn!(%err, status = %err.status(), "request failed");
                    err.into()
                }
            };
            Ok(response)
        })
    }
}
