//! # Grid State Simulation
//!
//! Produces one consistent snapshot of grid telemetry per call: load, frequency,
//! generation per source and a frequency-response battery dispatch. The battery
//! state of charge is the only state carried between calls.

use chrono::{Local, NaiveDateTime, Timelike};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::PI;
use tracing::debug;

use super::scenario::{Scenario, ScenarioProfile};

/// Nominal system frequency (Hz)
pub const NOMINAL_FREQUENCY_HZ: f64 = 50.0;
/// Battery charges above this frequency (Hz)
pub const UPPER_DEADBAND_HZ: f64 = 50.1;
/// Battery discharges below this frequency (Hz)
pub const LOWER_DEADBAND_HZ: f64 = 49.9;
/// Frequency limits applied during a blackout (Hz)
pub const BLACKOUT_FREQUENCY_RANGE_HZ: (f64, f64) = (48.0, 52.0);

/// Mean system demand before scenario bias (MW)
pub const BASE_LOAD_MW: f64 = 1800.0;
/// Demand floor outside blackout (MW)
pub const MIN_LOAD_MW: f64 = 1000.0;
/// Demand floor during blackout (MW)
pub const BLACKOUT_MIN_LOAD_MW: f64 = 200.0;
/// Fraction of demand that survives a blackout
pub const BLACKOUT_LOAD_FACTOR: f64 = 0.1;
/// Geothermal output retained after a generator trip
pub const GENERATOR_TRIP_GEOTHERMAL_FACTOR: f64 = 0.7;

pub const GEOTHERMAL_CAPACITY_MW: f64 = 1000.0;
pub const HYDRO_CAPACITY_MW: f64 = 900.0;
pub const WIND_CAPACITY_MW: f64 = 400.0;
pub const SOLAR_CAPACITY_MW: f64 = 300.0;
pub const THERMAL_CAPACITY_MW: f64 = 500.0;

/// Battery rated power, both directions (MW)
pub const BATTERY_RATED_POWER_MW: f64 = 300.0;
/// Battery usable energy (MWh)
pub const BATTERY_CAPACITY_MWH: f64 = 600.0;
/// Dispatch interval the battery power is assumed to hold for (s)
pub const DISPATCH_INTERVAL_SECS: f64 = 2.0;
/// Starting state of charge (%)
pub const DEFAULT_INITIAL_SOC_PERCENT: f64 = 65.0;

/// Solar produces only between these hours of day (inclusive)
const SOLAR_HOURS: std::ops::RangeInclusive<u32> = 6..=18;

fn dispatch_interval_hours() -> f64 {
    DISPATCH_INTERVAL_SECS / 3600.0
}

/// Largest charging power the remaining headroom can absorb in one interval (MW)
pub fn max_charge_power_mw(soc_percent: f64) -> f64 {
    let headroom_mwh = (100.0 - soc_percent).max(0.0) / 100.0 * BATTERY_CAPACITY_MWH;
    headroom_mwh / dispatch_interval_hours()
}

/// Largest discharging power the stored energy can sustain for one interval (MW)
pub fn max_discharge_power_mw(soc_percent: f64) -> f64 {
    let stored_mwh = soc_percent.max(0.0) / 100.0 * BATTERY_CAPACITY_MWH;
    stored_mwh / dispatch_interval_hours()
}

/// Battery state owned by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryState {
    /// State of charge in percent, always within [0, 100]
    pub soc_percent: f64,
}

impl BatteryState {
    pub fn new(soc_percent: f64) -> Self {
        Self {
            soc_percent: soc_percent.clamp(0.0, 100.0),
        }
    }
}

impl Default for BatteryState {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_SOC_PERCENT)
    }
}

/// Result of one battery dispatch decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryDispatch {
    /// Negative = charging, positive = discharging (MW)
    pub power_mw: f64,
    /// State of charge after the interval (%)
    pub soc_percent: f64,
}

/// Decide battery power from the frequency deviation.
///
/// Over-frequency charges from surplus conventional generation, under-frequency
/// discharges to cover the shortfall. Power is bounded by the rated power, the
/// generation imbalance and the energy available for one dispatch interval.
pub fn dispatch_battery(
    frequency_hz: f64,
    soc_percent: f64,
    conventional_mw: f64,
    load_mw: f64,
) -> BatteryDispatch {
    let dt_h = dispatch_interval_hours();

    if frequency_hz > UPPER_DEADBAND_HZ && soc_percent < 100.0 {
        let charge_mw = BATTERY_RATED_POWER_MW
            .min(conventional_mw - load_mw)
            .min(max_charge_power_mw(soc_percent));
        if charge_mw > 0.0 {
            let delta_pct = charge_mw * dt_h / BATTERY_CAPACITY_MWH * 100.0;
            return BatteryDispatch {
                power_mw: -charge_mw,
                soc_percent: (soc_percent + delta_pct).min(100.0),
            };
        }
    } else if frequency_hz < LOWER_DEADBAND_HZ && soc_percent > 0.0 {
        let discharge_mw = BATTERY_RATED_POWER_MW
            .min(load_mw - conventional_mw)
            .min(max_discharge_power_mw(soc_percent));
        if discharge_mw > 0.0 {
            let delta_pct = discharge_mw * dt_h / BATTERY_CAPACITY_MWH * 100.0;
            return BatteryDispatch {
                power_mw: discharge_mw,
                soc_percent: (soc_percent - delta_pct).max(0.0),
            };
        }
    }

    BatteryDispatch {
        power_mw: 0.0,
        soc_percent,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// One point-in-time view of the simulated grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    /// Local wall-clock time with no UTC offset, serialized as
    /// `YYYY-MM-DDTHH:MM:SS[.fff]`. Its hour drives the solar curve. The API
    /// envelope's own `timestamp` is UTC and marks when the response was built.
    pub timestamp: NaiveDateTime,
    /// System frequency (Hz)
    pub frequency: f64,
    /// Demand (MW)
    pub load_demand: f64,
    pub geothermal: f64,
    pub hydro: f64,
    pub wind: f64,
    pub solar: f64,
    pub thermal: f64,
    /// Negative = charging, positive = discharging (MW)
    pub battery_power: f64,
    /// State of charge after this step (%)
    pub battery_soc: f64,
    /// Sum of all sources plus battery power (MW)
    pub total_generation: f64,
    pub scenario: Scenario,
}

/// Grid simulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSimulatorConfig {
    /// Starting state of charge (%)
    pub initial_soc_percent: f64,
    /// Random seed for reproducibility (None = random)
    pub random_seed: Option<u64>,
}

impl Default for GridSimulatorConfig {
    fn default() -> Self {
        Self {
            initial_soc_percent: DEFAULT_INITIAL_SOC_PERCENT,
            random_seed: None,
        }
    }
}

/// Simulates grid telemetry under operator-selected scenarios
pub struct GridSimulator {
    battery: BatteryState,
    profiles: HashMap<Scenario, ScenarioProfile>,
    rng: StdRng,
}

impl GridSimulator {
    /// Create a new grid simulator
    pub fn new(config: GridSimulatorConfig) -> Self {
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(BatteryState::new(config.initial_soc_percent), rng)
    }

    pub(crate) fn with_rng(battery: BatteryState, rng: StdRng) -> Self {
        let profiles = Scenario::all()
            .into_iter()
            .map(|scenario| (scenario, ScenarioProfile::for_scenario(scenario)))
            .collect();
        Self {
            battery,
            profiles,
            rng,
        }
    }

    /// Current state of charge (%)
    pub fn soc(&self) -> f64 {
        self.battery.soc_percent
    }

    pub fn battery(&self) -> BatteryState {
        self.battery
    }

    /// Profile used for a scenario
    pub fn profile(&self, scenario: Scenario) -> ScenarioProfile {
        self.profiles
            .get(&scenario)
            .copied()
            .unwrap_or_else(|| ScenarioProfile::for_scenario(scenario))
    }

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Generate a snapshot for a scenario name at the current local time.
    ///
    /// Unrecognized names run the `normal` profile.
    pub fn generate_snapshot(&mut self, scenario_name: &str) -> GridSnapshot {
        let scenario = Scenario::parse_or_normal(scenario_name);
        self.generate_at(scenario, Local::now().naive_local())
    }

    /// Generate a snapshot for a scenario at an explicit time of day
    pub fn generate_at(&mut self, scenario: Scenario, at: NaiveDateTime) -> GridSnapshot {
        let profile = self.profile(scenario);

        let load_spread = 3.0 * profile.load_variation_mw;
        let load_mw = (BASE_LOAD_MW
            + self.rng.gen_range(-load_spread..=load_spread)
            + profile.load_bias_mw)
            .max(MIN_LOAD_MW);

        let freq_spread = profile.frequency_variation_hz;
        let mut frequency_hz = NOMINAL_FREQUENCY_HZ + self.rng.gen_range(-freq_spread..=freq_spread);

        let mut geothermal_mw = GEOTHERMAL_CAPACITY_MW * self.rng.gen_range(0.80..=0.95);
        let hydro_mw = HYDRO_CAPACITY_MW * self.rng.gen_range(0.70..=0.90);
        let thermal_mw = (THERMAL_CAPACITY_MW * self.rng.gen_range(0.40..=0.80)
            + profile.generation_bias_mw)
            .max(0.0);
        let wind_mw =
            (WIND_CAPACITY_MW * self.rng.gen_range(0.30..=0.80) + profile.wind_bias_mw).max(0.0);
        let solar_mw = self.solar_output(at.hour(), profile.solar_bias_mw);

        let conventional_mw = geothermal_mw + hydro_mw + thermal_mw;
        let dispatch = dispatch_battery(
            frequency_hz,
            self.battery.soc_percent,
            conventional_mw,
            load_mw,
        );
        if dispatch.power_mw != 0.0 {
            debug!(
                scenario = %scenario,
                frequency_hz,
                battery_power_mw = dispatch.power_mw,
                soc_before = self.battery.soc_percent,
                soc_after = dispatch.soc_percent,
                "battery dispatch"
            );
        }
        self.battery.soc_percent = dispatch.soc_percent;

        let mut load_demand_mw = load_mw;
        match scenario {
            Scenario::GeneratorTrip => {
                geothermal_mw *= GENERATOR_TRIP_GEOTHERMAL_FACTOR;
            }
            Scenario::Blackout => {
                load_demand_mw = (load_mw * BLACKOUT_LOAD_FACTOR).max(BLACKOUT_MIN_LOAD_MW);
                let (low, high) = BLACKOUT_FREQUENCY_RANGE_HZ;
                frequency_hz = frequency_hz.clamp(low, high);
            }
            _ => {}
        }

        let total_generation_mw =
            geothermal_mw + hydro_mw + wind_mw + solar_mw + thermal_mw + dispatch.power_mw;

        GridSnapshot {
            timestamp: at,
            frequency: round_to(frequency_hz, 2),
            load_demand: round_to(load_demand_mw, 1),
            geothermal: round_to(geothermal_mw, 1),
            hydro: round_to(hydro_mw, 1),
            wind: round_to(wind_mw, 1),
            solar: round_to(solar_mw, 1),
            thermal: round_to(thermal_mw, 1),
            battery_power: round_to(dispatch.power_mw, 1),
            battery_soc: round_to(self.battery.soc_percent, 1),
            total_generation: round_to(total_generation_mw, 1),
            scenario,
        }
    }

    /// Solar output for an hour of day, following a half-sine from 06:00 to 18:00
    fn solar_output(&mut self, hour: u32, bias_mw: f64) -> f64 {
        if !SOLAR_HOURS.contains(&hour) {
            return 0.0;
        }
        let elevation = ((hour as f64 - 6.0) * PI / 12.0).sin();
        (SOLAR_CAPACITY_MW * elevation * self.rng.gen_range(0.8..=1.0) + bias_mw).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rstest::rstest;

    fn at_hour(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn seeded(seed: u64, soc: f64) -> GridSimulator {
        GridSimulator::new(GridSimulatorConfig {
            initial_soc_percent: soc,
            random_seed: Some(seed),
        })
    }

    #[test]
    fn test_grid_simulator_initialization() {
        let simulator = seeded(42, DEFAULT_INITIAL_SOC_PERCENT);
        assert_eq!(simulator.soc(), 65.0);
        assert_eq!(
            simulator.profile(Scenario::Blackout),
            ScenarioProfile::for_scenario(Scenario::Blackout)
        );
    }

    #[test]
    fn test_initial_soc_is_clamped() {
        assert_eq!(seeded(1, 140.0).soc(), 100.0);
        assert_eq!(seeded(1, -5.0).soc(), 0.0);
    }

    #[rstest]
    #[case(Scenario::Normal)]
    #[case(Scenario::LoadSurge)]
    #[case(Scenario::GeneratorTrip)]
    #[case(Scenario::RenewableDrop)]
    #[case(Scenario::Blackout)]
    fn test_snapshot_invariants(#[case] scenario: Scenario) {
        let mut simulator = seeded(7, DEFAULT_INITIAL_SOC_PERCENT);
        for i in 0..500 {
            let soc_before = simulator.soc();
            let snapshot = simulator.generate_at(scenario, at_hour(i % 24));

            assert_eq!(snapshot.scenario, scenario);
            assert!((0.0..=100.0).contains(&snapshot.battery_soc));
            assert!(snapshot.battery_power.abs() <= BATTERY_RATED_POWER_MW);
            if snapshot.battery_power < 0.0 {
                assert!(-snapshot.battery_power <= max_charge_power_mw(soc_before) + 0.05);
            } else {
                assert!(snapshot.battery_power <= max_discharge_power_mw(soc_before) + 0.05);
            }

            let sum = snapshot.geothermal
                + snapshot.hydro
                + snapshot.wind
                + snapshot.solar
                + snapshot.thermal
                + snapshot.battery_power;
            assert!((snapshot.total_generation - sum).abs() <= 0.35);

            if scenario == Scenario::Blackout {
                assert!((48.0..=52.0).contains(&snapshot.frequency));
                assert!(snapshot.load_demand >= BLACKOUT_MIN_LOAD_MW);
            } else {
                assert!(snapshot.load_demand >= MIN_LOAD_MW);
            }
        }
    }

    #[test]
    fn test_blackout_load_is_small_fraction() {
        let mut simulator = seeded(11, DEFAULT_INITIAL_SOC_PERCENT);
        for _ in 0..200 {
            let snapshot = simulator.generate_at(Scenario::Blackout, at_hour(12));
            // the unadjusted load never drops below MIN_LOAD_MW
            assert!(snapshot.load_demand <= 0.2 * MIN_LOAD_MW);
            assert!(snapshot.load_demand >= BLACKOUT_MIN_LOAD_MW);
        }
    }

    #[test]
    fn test_soc_unchanged_inside_deadband() {
        // every draw lands inside the deadband
        let mut simulator = seeded(2024, 65.0);
        let mut profile = simulator.profile(Scenario::Normal);
        profile.frequency_variation_hz = 0.09;
        simulator.profiles.insert(Scenario::Normal, profile);

        for _ in 0..500 {
            let snapshot = simulator.generate_at(Scenario::Normal, at_hour(12));
            assert!(snapshot.frequency >= LOWER_DEADBAND_HZ && snapshot.frequency <= UPPER_DEADBAND_HZ);
            assert_eq!(snapshot.battery_power, 0.0);
            assert_eq!(snapshot.battery_soc, 65.0);
        }
        assert_eq!(simulator.soc(), 65.0);
    }

    #[test]
    fn test_dispatch_idles_across_deadband() {
        let mut soc = 65.0;
        for step in 0..=20 {
            let frequency = (LOWER_DEADBAND_HZ + f64::from(step) * 0.01).min(UPPER_DEADBAND_HZ);
            // surplus and shortfall both leave the battery idle
            for (conventional, load) in [(2600.0, 1800.0), (1500.0, 2200.0)] {
                let dispatch = dispatch_battery(frequency, soc, conventional, load);
                assert_eq!(dispatch.power_mw, 0.0, "frequency {frequency}");
                soc = dispatch.soc_percent;
            }
        }
        assert_eq!(soc, 65.0);
    }

    #[test]
    fn test_snapshot_timestamp_is_naive_local_time() {
        let snapshot = seeded(5, 65.0).generate_at(Scenario::Normal, at_hour(14));
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["timestamp"], "2024-06-15T14:00:00");
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let mut a = seeded(99, 65.0);
        let mut b = seeded(99, 65.0);
        for hour in 0..24 {
            assert_eq!(
                a.generate_at(Scenario::LoadSurge, at_hour(hour)),
                b.generate_at(Scenario::LoadSurge, at_hour(hour))
            );
        }
    }

    #[rstest]
    #[case(0)]
    #[case(3)]
    #[case(5)]
    #[case(19)]
    #[case(23)]
    fn test_no_solar_at_night(#[case] hour: u32) {
        let mut simulator = seeded(5, 65.0);
        for _ in 0..20 {
            assert_eq!(simulator.generate_at(Scenario::Normal, at_hour(hour)).solar, 0.0);
        }
    }

    #[rstest]
    #[case(7)]
    #[case(9)]
    #[case(12)]
    #[case(15)]
    #[case(17)]
    fn test_solar_during_daylight(#[case] hour: u32) {
        let mut simulator = seeded(5, 65.0);
        for _ in 0..20 {
            assert!(simulator.generate_at(Scenario::Normal, at_hour(hour)).solar > 0.0);
        }
    }

    #[test]
    fn test_generator_trip_reduces_geothermal() {
        let mut simulator = seeded(3, 65.0);
        for _ in 0..100 {
            let snapshot = simulator.generate_at(Scenario::GeneratorTrip, at_hour(12));
            assert!(snapshot.geothermal <= GEOTHERMAL_CAPACITY_MW * 0.95 * 0.7 + 0.05);
            assert!(snapshot.geothermal >= GEOTHERMAL_CAPACITY_MW * 0.80 * 0.7 - 0.05);
        }
    }

    #[test]
    fn test_unknown_scenario_falls_back_to_normal() {
        let mut simulator = seeded(8, 65.0);
        let snapshot = simulator.generate_snapshot("meteor_strike");
        assert_eq!(snapshot.scenario, Scenario::Normal);
        let value = serde_json::to_value(&snapshot).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        let normal = serde_json::to_value(simulator.generate_snapshot("normal")).unwrap();
        let mut normal_keys: Vec<_> = normal.as_object().unwrap().keys().cloned().collect();
        normal_keys.sort();
        assert_eq!(keys, normal_keys);
    }

    #[test]
    fn test_dispatch_charges_on_over_frequency() {
        let dispatch = dispatch_battery(50.3, 50.0, 2000.0, 1800.0);
        assert_eq!(dispatch.power_mw, -200.0);
        assert!(dispatch.soc_percent > 50.0);
    }

    #[test]
    fn test_dispatch_discharges_on_under_frequency() {
        let dispatch = dispatch_battery(49.7, 50.0, 1500.0, 1900.0);
        assert_eq!(dispatch.power_mw, BATTERY_RATED_POWER_MW);
        assert!(dispatch.soc_percent < 50.0);
    }

    #[test]
    fn test_dispatch_idles_without_imbalance() {
        // over-frequency but no surplus to absorb
        let dispatch = dispatch_battery(50.3, 50.0, 1700.0, 1800.0);
        assert_eq!(dispatch.power_mw, 0.0);
        assert_eq!(dispatch.soc_percent, 50.0);
    }

    #[test]
    fn test_dispatch_respects_full_and_empty() {
        let full = dispatch_battery(50.5, 100.0, 2500.0, 1800.0);
        assert_eq!(full, BatteryDispatch { power_mw: 0.0, soc_percent: 100.0 });

        let empty = dispatch_battery(49.5, 0.0, 1000.0, 1800.0);
        assert_eq!(empty, BatteryDispatch { power_mw: 0.0, soc_percent: 0.0 });
    }

    #[test]
    fn test_dispatch_limited_by_headroom() {
        let soc = 99.99;
        let dispatch = dispatch_battery(50.5, soc, 2500.0, 1800.0);
        assert!((dispatch.power_mw + max_charge_power_mw(soc)).abs() < 1e-9);
        assert!(dispatch.soc_percent <= 100.0);
    }

    proptest! {
        #[test]
        fn prop_dispatch_stays_within_bounds(
            frequency in 47.0f64..53.0,
            soc in 0.0f64..=100.0,
            conventional in 0.0f64..3000.0,
            load in 0.0f64..3000.0,
        ) {
            let dispatch = dispatch_battery(frequency, soc, conventional, load);
            prop_assert!((0.0..=100.0).contains(&dispatch.soc_percent));
            prop_assert!(dispatch.power_mw.abs() <= BATTERY_RATED_POWER_MW);
            if dispatch.power_mw < 0.0 {
                prop_assert!(frequency > UPPER_DEADBAND_HZ);
                prop_assert!(-dispatch.power_mw <= max_charge_power_mw(soc) + 1e-9);
                prop_assert!(dispatch.soc_percent >= soc);
            } else if dispatch.power_mw > 0.0 {
                prop_assert!(frequency < LOWER_DEADBAND_HZ);
                prop_assert!(dispatch.power_mw <= max_discharge_power_mw(soc) + 1e-9);
                prop_assert!(dispatch.soc_percent <= soc);
            } else {
                prop_assert_eq!(dispatch.soc_percent, soc);
            }
        }

        #[test]
        fn prop_soc_stays_in_range(seed in any::<u64>(), soc in 0.0f64..=100.0, hour in 0u32..24) {
            let mut simulator = seeded(seed, soc);
            for scenario in Scenario::all() {
                let snapshot = simulator.generate_at(scenario, at_hour(hour));
                prop_assert!((0.0..=100.0).contains(&snapshot.battery_soc));
                prop_assert!((0.0..=100.0).contains(&simulator.soc()));
            }
        }
    }
}
