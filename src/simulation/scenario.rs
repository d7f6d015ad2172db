//! # Grid Scenarios
//!
//! Named operating conditions and the perturbation parameters each one feeds
//! into the grid simulator.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};
use thiserror::Error;

/// Simulation-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),
}

/// Grid operating scenario selectable by the operator
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Scenario {
    /// Steady state, small fluctuations
    #[default]
    Normal,
    /// Sudden demand increase
    LoadSurge,
    /// Loss of a large conventional unit
    GeneratorTrip,
    /// Wind and solar output collapse
    RenewableDrop,
    /// System-wide outage
    Blackout,
}

impl Scenario {
    /// All recognized scenarios in display order
    pub fn all() -> Vec<Scenario> {
        Scenario::iter().collect()
    }

    /// Resolve a scenario name, substituting `Normal` for anything unrecognized.
    ///
    /// Callers that need strict validation should use `str::parse` instead.
    pub fn parse_or_normal(name: &str) -> Self {
        name.parse().unwrap_or(Scenario::Normal)
    }
}

impl std::str::FromStr for Scenario {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::iter()
            .find(|scenario| scenario.as_ref() == s)
            .ok_or_else(|| SimulationError::UnknownScenario(s.to_string()))
    }
}

/// Perturbation parameters for a single scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProfile {
    /// Frequency draw amplitude around nominal (Hz)
    pub frequency_variation_hz: f64,
    /// Load draw amplitude; the draw spans ±3x this value (MW)
    pub load_variation_mw: f64,
    /// Added to drawn load (MW)
    pub load_bias_mw: f64,
    /// Added to thermal output (MW)
    pub generation_bias_mw: f64,
    /// Added to solar output during daylight (MW)
    pub solar_bias_mw: f64,
    /// Added to wind output (MW)
    pub wind_bias_mw: f64,
}

impl ScenarioProfile {
    const fn new(frequency_variation_hz: f64, load_variation_mw: f64) -> Self {
        Self {
            frequency_variation_hz,
            load_variation_mw,
            load_bias_mw: 0.0,
            generation_bias_mw: 0.0,
            solar_bias_mw: 0.0,
            wind_bias_mw: 0.0,
        }
    }

    /// Fixed profile for a scenario
    pub fn for_scenario(scenario: Scenario) -> Self {
        match scenario {
            Scenario::Normal => Self::new(0.12, 20.0),
            Scenario::LoadSurge => Self {
                load_bias_mw: 400.0,
                ..Self::new(0.30, 40.0)
            },
            Scenario::GeneratorTrip => Self {
                generation_bias_mw: -200.0,
                ..Self::new(0.35, 30.0)
            },
            Scenario::RenewableDrop => Self {
                solar_bias_mw: -150.0,
                wind_bias_mw: -200.0,
                ..Self::new(0.25, 25.0)
            },
            Scenario::Blackout => Self {
                generation_bias_mw: -800.0,
                ..Self::new(1.50, 50.0)
            },
        }
    }
}
