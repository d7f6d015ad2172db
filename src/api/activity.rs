use axum::extract::State;
use serde::Deserialize;

use crate::{
    api::{error::ApiError, extract::ApiQuery, response::ApiResponse},
    auth::AuthBearer,
    controller::AppState,
    repo::ActivityEntry,
};

const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<usize>,
}

/// GET /api/v1/activity - the caller's recent activity, newest first
pub async fn list_activity(
    State(st): State<AppState>,
    AuthBearer(user): AuthBearer,
    ApiQuery(q): ApiQuery<ActivityQuery>,
) -> Result<ApiResponse<Vec<ActivityEntry>>, ApiError> {
    let limit = q.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let entries = st.repos.activity.recent(user.id, limit).await?;
    let count = entries.len();
    Ok(ApiResponse::success(entries).with_count(count))
}
