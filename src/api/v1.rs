use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    api::{activity, auth, grid, health, scenarios},
    controller::AppState,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/grid/status", get(grid::get_grid_status))
        .route("/grid/history", get(grid::get_grid_history))
        .route(
            "/scenarios",
            get(scenarios::list_scenarios).post(scenarios::set_scenario),
        )
        .route("/activity", get(activity::list_activity))
        .with_state(state)
}
