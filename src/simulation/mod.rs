//! # Grid Simulation Module
//!
//! Derives plausible power-system telemetry for a small national grid from random
//! draws and simple physical formulas.
//!
//! ## Components
//!
//! - **Scenario**: Named operating conditions and their perturbation profiles
//! - **Grid**: Single-step simulator owning the battery state of charge
//! - **History**: Synthesized trend points for charts
//!
//! ## Usage
//!
//! ```rust
//! use grid_scenario_dashboard::simulation::{GridSimulator, GridSimulatorConfig};
//!
//! let mut simulator = GridSimulator::new(GridSimulatorConfig {
//!     random_seed: Some(42),
//!     ..Default::default()
//! });
//!
//! let snapshot = simulator.generate_snapshot("load_surge");
//! assert!((0.0..=100.0).contains(&snapshot.battery_soc));
//! ```

pub mod grid;
pub mod history;
pub mod scenario;

pub use grid::{
    dispatch_battery, BatteryDispatch, BatteryState, GridSimulator, GridSimulatorConfig,
    GridSnapshot,
};
pub use history::{HistoryPoint, MAX_HISTORY_POINTS};
pub use scenario::{Scenario, ScenarioProfile, SimulationError};
