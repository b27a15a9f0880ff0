use std::time::Instant;

use axum::{extract::Request, http::header::CONTENT_LENGTH, middleware::Next, response::Response};
use tracing::{info, warn};

/// One log line per request with method, url, status, size and latency.
pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let length = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);
    let elapsed_ms = start.elapsed().as_millis() as u64;

    if status.is_server_error() {
        warn!(
            method = %method,
            url = %uri,
            status = status.as_u16(),
            length = length,
            elapsed_ms = elapsed_ms,
            "HTTP request failed"
        );
    } else {
        info!(
            method = %method,
            url = %uri,
            status = status.as_u16(),
            length = length,
            elapsed_ms = elapsed_ms,
            "HTTP request"
        );
    }

    response
}
