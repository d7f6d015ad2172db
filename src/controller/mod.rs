use anyhow::Result;
use chrono::{Duration, Local};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::auth::TokenIssuer;
use crate::config::{Config, MAX_HISTORY_INTERVAL_SECS};
use crate::repo::Repositories;
use crate::simulation::{GridSimulator, GridSnapshot, HistoryPoint, Scenario};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub grid: Arc<GridController>,
    pub repos: Arc<Repositories>,
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    pub async fn new(cfg: Config) -> Result<Self> {
        cfg.validate()?;
        let repos = Arc::new(Repositories::in_memory(&cfg));
        Ok(Self::with_repositories(cfg, repos))
    }

    pub fn with_repositories(cfg: Config, repos: Arc<Repositories>) -> Self {
        let simulator = GridSimulator::new(cfg.simulation.simulator_config());
        let grid = Arc::new(GridController::new(
            simulator,
            cfg.simulation.default_scenario,
            Duration::seconds(
                cfg.simulation
                    .history_interval_secs
                    .clamp(1, MAX_HISTORY_INTERVAL_SECS),
            ),
        ));
        let tokens = Arc::new(TokenIssuer::new(&cfg.auth));
        Self {
            cfg,
            grid,
            repos,
            tokens,
        }
    }
}

/// Owns the single simulator instance.
///
/// Every snapshot is produced under the simulator mutex, so the state-of-charge
/// read-modify-write is atomic across concurrent requests. The lock is never
/// held across an await point.
pub struct GridController {
    simulator: Mutex<GridSimulator>,
    active: RwLock<Scenario>,
    history_interval: Duration,
    started: Instant,
}

impl GridController {
    pub fn new(simulator: GridSimulator, initial: Scenario, history_interval: Duration) -> Self {
        Self {
            simulator: Mutex::new(simulator),
            active: RwLock::new(initial),
            history_interval,
            started: Instant::now(),
        }
    }

    pub fn active_scenario(&self) -> Scenario {
        *self.active.read()
    }

    /// Switch the active scenario, returning the previous one
    pub fn set_scenario(&self, scenario: Scenario) -> Scenario {
        let previous = std::mem::replace(&mut *self.active.write(), scenario);
        info!(from = %previous, to = %scenario, "scenario changed");
        previous
    }

    /// Generate a snapshot for `scenario`, or the active scenario when `None`
    pub fn snapshot(&self, scenario: Option<Scenario>) -> GridSnapshot {
        let scenario = scenario.unwrap_or_else(|| self.active_scenario());
        let now = Local::now().naive_local();
        self.simulator.lock().generate_at(scenario, now)
    }

    pub fn history(&self, points: usize) -> Vec<HistoryPoint> {
        let scenario = self.active_scenario();
        let now = Local::now().naive_local();
        self.simulator
            .lock()
            .synthesize_history(scenario, points, self.history_interval, now)
    }

    pub fn soc(&self) -> f64 {
        self.simulator.lock().soc()
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
