//! Shared types for the HTTP layer.

use std::sync::Arc;

use crate::config::Settings;
use crate::pipeline::QualityPipeline;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all routes. Read-only after construction.
#[derive(Clone)]
pub struct ApiContext {
    pub settings: Arc<Settings>,
    pub pipeline: Arc<QualityPipeline>,
}

impl ApiContext {
    pub fn new(settings: Settings) -> Self {
        Self::with_pipeline(settings, QualityPipeline::standard())
    }

    pub fn with_pipeline(settings: Settings, pipeline: QualityPipeline) -> Self {
        Self {
            settings: Arc::new(settings),
            pipeline: Arc::new(pipeline),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Request context: injected by middleware
// ═══════════════════════════════════════════════════════════

/// Correlation id for one request, injected into request extensions by the
/// request-id middleware and echoed in the `X-Request-ID` response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
