//! Synthesized trend data for the dashboard charts.
//!
//! There is no stored history; points are drawn fresh from a scratch simulator
//! that starts at the live state of charge, so the live battery is untouched.

use chrono::{Duration, NaiveDateTime};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::grid::GridSimulator;
use super::scenario::Scenario;

/// Upper bound on points returned in a single history request
pub const MAX_HISTORY_POINTS: usize = 500;

/// Reduced snapshot used for trend charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Local wall-clock time, same convention as `GridSnapshot::timestamp`
    pub timestamp: NaiveDateTime,
    pub frequency: f64,
    pub load_demand: f64,
    pub total_generation: f64,
    pub battery_soc: f64,
}

impl GridSimulator {
    /// Synthesize `points` history points ending at `end`, oldest first.
    ///
    /// `points` is clamped to `1..=MAX_HISTORY_POINTS`. Points whose timestamp
    /// falls outside the representable date range are left out.
    pub fn synthesize_history(
        &mut self,
        scenario: Scenario,
        points: usize,
        interval: Duration,
        end: NaiveDateTime,
    ) -> Vec<HistoryPoint> {
        let points = points.clamp(1, MAX_HISTORY_POINTS);
        let seed: u64 = self.rng_mut().gen();
        let mut scratch = GridSimulator::with_rng(self.battery(), StdRng::seed_from_u64(seed));

        (0..points)
            .rev()
            .filter_map(|steps_back| {
                let offset = interval.checked_mul(i32::try_from(steps_back).ok()?)?;
                end.checked_sub_signed(offset)
            })
            .map(|at| {
                let snapshot = scratch.generate_at(scenario, at);
                HistoryPoint {
                    timestamp: snapshot.timestamp,
                    frequency: snapshot.frequency,
                    load_demand: snapshot.load_demand,
                    total_generation: snapshot.total_generation,
                    battery_soc: snapshot.battery_soc,
                }
            })
            .collect()
    }
}
