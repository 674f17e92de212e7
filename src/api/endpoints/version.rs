use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct VersionResponse {
    pub app: String,
    pub version: String,
}

/// `GET /version`: configured application name and version.
pub async fn show(State(ctx): State<ApiContext>) -> Json<VersionResponse> {
    Json(VersionResponse {
        app: ctx.settings.app_name.clone(),
        version: ctx.settings.app_version.clone(),
    })
}
