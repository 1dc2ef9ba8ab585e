//! Request logging middleware
//!
//! Logs method, route, status and duration of every HTTP request.

use std::{
    fmt::Display,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};

use axum::{body::Body, extract::MatchedPath};
use http::{Request, Response};
use tower::Layer;

#[derive(Clone, Default)]
pub struct AccessLogLayer;

impl<Service> Layer<Service> for AccessLogLayer
where
    Service: Send + Clone,
{
    type Service = AccessLogService<Service>;

    fn layer(&self, next: Service) -> Self::Service {
        AccessLogService { next }
    }
}

#[derive(Clone)]
pub struct AccessLogService<Service> {
    next: Service,
}

impl<Service, ReqBody> tower::Service<Request<ReqBody>> for AccessLogService<Service>
where
    Service: tower::Service<Request<ReqBody>, Response = Response<Body>> + Send + Clone + 'static,
    Service::Future: Send,
    Service::Error: Display + 'static,
    ReqBody: Send + 'static,
{
    type Response = Response<Body>;
    type Error = Service::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response<Body>, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.next.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let route = req
            .extensions()
            .get::<MatchedPath>()
            .map(|matched_path| matched_path.as_str().to_owned())
            .unwrap_or_else(|| req.uri().path().to_owned());

        let method = req.method().clone();

        // Take the service that was driven to readiness, leave a fresh clone behind.
        let clone = self.next.clone();
        let mut next = std::mem::replace(&mut self.next, clone);

        Box::pin(async move {
            let started = Instant::now();
            let result = next.call(req).await;
            let elapsed = started.elapsed().as_millis();

            match &result {
                Ok(response) if response.status().is_server_error() => {
                    log::warn!("{method} {route} -> {} in {elapsed}ms", response.status().as_u16());
                }
                Ok(response) => {
                    log::info!("{method} {route} -> {} in {elapsed}ms", response.status().as_u16());
                }
                Err(e) => log::error!("{method} {route} failed after {elapsed}ms: {e}"),
            }

            result
        })
    }
}
