/// Dashboard analytics endpoint
///
/// `GET /v1/analytics` recomputes the caller's summaries from a single
/// task scan; nothing is cached or persisted. If the scan fails the whole
/// request fails -- there is no partial analytics response.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use serde::Serialize;
use taskdeck_shared::{
    analytics::{compute_analytics, AnalyticsData},
    auth::CurrentUser,
    models::task::Task,
};

/// Analytics response envelope
#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub success: bool,
    pub message: String,
    pub data: AnalyticsData,
}

/// Computes the priority distribution and day-wise completion summaries
pub async fn get_analytics(
    State(state): State<AppState>,
    Extension(auth): Extension<CurrentUser>,
) -> ApiResult<Json<AnalyticsResponse>> {
    let tasks = Task::list_for_analytics(&state.db, auth.id).await?;

    tracing::debug!(user_id = %auth.id, task_count = tasks.len(), "computing analytics");

    let data = compute_analytics(&tasks);

    Ok(Json(AnalyticsResponse {
        success: true,
        message: "Dashboard analytics fetched successfully".to_string(),
        data,
    }))
}
