use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{Json, Response},
};
use serde_json::Value;
use tracing::warn;

use super::api::error_response;

/// Largest request body accepted, in bytes
pub const MAX_REQUEST_SIZE: u64 = 1024 * 1024;

/// Reject requests whose declared body exceeds [`MAX_REQUEST_SIZE`]
pub async fn request_size_middleware(
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, Json<Value>)> {
    validate_request_size(&request)?;
    Ok(next.run(request).await)
}

fn validate_request_size(request: &Request<Body>) -> Result<(), (StatusCode, Json<Value>)> {
    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());

    match declared {
        Some(length) if length > MAX_REQUEST_SIZE => {
            warn!("Request too large: {} bytes", length);
            Err(error_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request too large",
                format!(
                    "Request size {} bytes exceeds maximum of {} bytes",
                    length, MAX_REQUEST_SIZE
                ),
            ))
        }
        _ => Ok(()),
    }
}

/// Security headers middleware
pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    response
}
