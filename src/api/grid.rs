//! Grid telemetry endpoints

use axum::extract::State;
use serde::Deserialize;

use crate::{
    api::{error::ApiError, extract::ApiQuery, response::ApiResponse},
    auth::AuthBearer,
    controller::AppState,
    simulation::{GridSnapshot, HistoryPoint, Scenario},
};

#[derive(Debug, Deserialize)]
pub struct GridStatusQuery {
    /// Overrides the active scenario for this snapshot only
    pub scenario: Option<String>,
}

/// GET /api/v1/grid/status - one fresh snapshot
pub async fn get_grid_status(
    State(st): State<AppState>,
    AuthBearer(_): AuthBearer,
    ApiQuery(q): ApiQuery<GridStatusQuery>,
) -> Result<ApiResponse<GridSnapshot>, ApiError> {
    let scenario = q
        .scenario
        .as_deref()
        .map(str::parse::<Scenario>)
        .transpose()?;
    let snapshot = st.grid.snapshot(scenario);
    let scenario = snapshot.scenario;
    Ok(ApiResponse::success(snapshot).with_scenario(scenario))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub points: Option<usize>,
}

/// GET /api/v1/grid/history - synthesized trend points for the active scenario
pub async fn get_grid_history(
    State(st): State<AppState>,
    AuthBearer(_): AuthBearer,
    ApiQuery(q): ApiQuery<HistoryQuery>,
) -> ApiResponse<Vec<HistoryPoint>> {
    let points = q.points.unwrap_or(st.cfg.simulation.history_points);
    let history = st.grid.history(points);
    let count = history.len();
    ApiResponse::success(history)
        .with_count(count)
        .with_scenario(st.grid.active_scenario())
}
