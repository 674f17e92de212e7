//! HTTP surface of the quality gate.
//!
//! A thin adapter over `pipeline`: it extracts the uploaded part, runs the
//! pipeline on the blocking pool and maps errors to status codes. Routes are
//! flat (`/health`, `/version`, `/quality`) behind a small middleware stack:
//! CORS → Request ID → Access log → Timeout → Handler.
//!
//! `quality_router()` returns a `Router` that can be mounted on any axum server.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::quality_router;
pub use server::{serve, start_server_on, QualityServer, ServerError};
pub use types::ApiContext;
