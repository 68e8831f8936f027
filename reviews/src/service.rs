use crate::errors::ReviewsError;
use crate::handler::ReviewHandler;
use http_body_util::BodyExt;
use http_body_util::combinators::BoxBody;
use hyper::body::{Bytes, Incoming};
use hyper::service::Service;
use hyper::{Request, Response};
use shared::http::full_body;
use std::future::Future;
use std::pin::Pin;

/// Adapts [`ReviewHandler`] to hyper by buffering each request body.
pub struct ReviewService {
    handler: ReviewHandler,
}

impl ReviewService {
    pub fn new(handler: ReviewHandler) -> Self {
        Self { handler }
    }
}

impl Service<Request<Incoming>> for ReviewService {
    type Response = Response<BoxBody<Bytes, Self::Error>>;
    type Error = ReviewsError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let handler = self.handler.clone();

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let response = match body.collect().await {
                Ok(collected) => handler.handle(Request::from_parts(parts, collected.to_bytes())),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read request body");
                    ReviewsError::RequestBodyError(e.to_string()).into_response()
                }
            };

            Ok(response.map(|body| full_body(body)))
        })
    }
}
