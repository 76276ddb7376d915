//! Request metrics middleware

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use common::metrics::{labels, HTTP_REQUESTS, HTTP_REQUEST_DURATION};
use metrics::{counter, histogram};
use std::time::Instant;

/// Count every request and record its latency by method and status
pub async fn track_metrics(req: Request<Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    counter!(
        HTTP_REQUESTS,
        labels::METHOD => method.clone(),
        labels::STATUS => status.clone()
    )
    .increment(1);
    histogram!(
        HTTP_REQUEST_DURATION,
        labels::METHOD => method,
        labels::STATUS => status
    )
    .record(start.elapsed().as_secs_f64());

    response
}
