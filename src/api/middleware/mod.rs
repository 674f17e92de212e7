//! HTTP middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Request ID: echo or mint `X-Request-ID`
//! 2. Access log: one line per request, carries the request id

pub mod access_log;
pub mod request_id;
