//! Request correlation id.
//!
//! A client-supplied `X-Request-ID` is echoed back; otherwise one is minted.
//! Either way it is stored in request extensions for the access log and set
//! on the response.

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::api::types::RequestId;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied id we echo back unchanged.
const MAX_REQUEST_ID_LEN: usize = 128;

pub fn generate_request_id() -> String {
    format!("rid-{}", Uuid::new_v4())
}

/// Accept a client id only if it is short, printable ASCII.
fn client_request_id(req: &Request<Body>) -> Option<String> {
    let raw = req.headers().get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    let acceptable = !raw.is_empty()
        && raw.len() <= MAX_REQUEST_ID_LEN
        && raw.bytes().all(|b| b.is_ascii_graphic());
    acceptable.then(|| raw.to_string())
}

pub async fn assign_request_id(mut req: Request<Body>, next: Next) -> Response {
    let id = client_request_id(&req).unwrap_or_else(generate_request_id);
    req.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
