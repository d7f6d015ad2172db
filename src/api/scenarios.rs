//! Scenario selection endpoints

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::{
    api::{error::ApiError, extract::ApiJson, response::ApiResponse},
    auth::AuthBearer,
    controller::AppState,
    repo::ActivityAction,
    simulation::Scenario,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct ScenarioList {
    pub active: Scenario,
    pub available: Vec<Scenario>,
}

/// GET /api/v1/scenarios
pub async fn list_scenarios(
    State(st): State<AppState>,
    AuthBearer(_): AuthBearer,
) -> ApiResponse<ScenarioList> {
    ApiResponse::success(ScenarioList {
        active: st.grid.active_scenario(),
        available: Scenario::all(),
    })
}

#[derive(Debug, Deserialize)]
pub struct SetScenarioRequest {
    pub scenario: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScenarioChanged {
    pub previous: Scenario,
    pub active: Scenario,
}

/// POST /api/v1/scenarios - switch the active scenario
pub async fn set_scenario(
    State(st): State<AppState>,
    AuthBearer(user): AuthBearer,
    ApiJson(req): ApiJson<SetScenarioRequest>,
) -> Result<ApiResponse<ScenarioChanged>, ApiError> {
    let scenario: Scenario = req.scenario.parse()?;
    let previous = st.grid.set_scenario(scenario);
    st.repos
        .activity
        .record(
            user.id,
            ActivityAction::ScenarioChange,
            Some(format!("{previous} -> {scenario}")),
        )
        .await?;

    Ok(ApiResponse::success(ScenarioChanged {
        previous,
        active: scenario,
    }))
}
