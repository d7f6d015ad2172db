//! Grid Scenario Dashboard
//!
//! Login-gated HTTP service serving simulated grid telemetry (frequency, load,
//! generation mix, battery state of charge) under operator-selected scenarios.

pub mod api;
pub mod auth;
pub mod config;
pub mod controller;
pub mod repo;
pub mod simulation;
pub mod telemetry;
