use anyhow::Result;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use std::net::SocketAddr;

use crate::simulation::{GridSimulatorConfig, Scenario};

/// Secret shipped in `config/default.toml`; only acceptable for local development
pub const DEV_JWT_SECRET: &str = "dev-secret-change-me-dev-secret-change-me";

/// One week
pub const MAX_TOKEN_TTL_MINUTES: i64 = 7 * 24 * 60;
/// One day between history points
pub const MAX_HISTORY_INTERVAL_SECS: i64 = 86_400;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub simulation: SimulationConfig,
    pub activity: ActivityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    pub cors_origin: String,
    pub request_timeout_secs: u64,
}
impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    pub initial_soc_percent: f64,
    pub random_seed: Option<u64>,
    pub default_scenario: Scenario,
    pub history_points: usize,
    pub history_interval_secs: i64,
}

impl SimulationConfig {
    pub fn simulator_config(&self) -> GridSimulatorConfig {
        GridSimulatorConfig {
            initial_soc_percent: self.initial_soc_percent,
            random_seed: self.random_seed,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityConfig { pub max_entries: usize }

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("GRIDDASH__").split("__"));
        Ok(figment.extract()?)
    }

    /// Fail fast on settings that would leave the service insecure or unusable
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.len() < 32 {
            anyhow::bail!(
                "SECURITY ERROR: GRIDDASH__AUTH__JWT_SECRET must be set to a random secret (min 32 chars). \
                Generate one with: openssl rand -base64 32"
            );
        }
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&self.auth.token_ttl_minutes) {
            anyhow::bail!(
                "auth.token_ttl_minutes must be within 1-{MAX_TOKEN_TTL_MINUTES}, got {}",
                self.auth.token_ttl_minutes
            );
        }
        if !(0.0..=100.0).contains(&self.simulation.initial_soc_percent) {
            anyhow::bail!(
                "simulation.initial_soc_percent must be within 0-100, got {}",
                self.simulation.initial_soc_percent
            );
        }
        if !(1..=MAX_HISTORY_INTERVAL_SECS).contains(&self.simulation.history_interval_secs) {
            anyhow::bail!(
                "simulation.history_interval_secs must be within 1-{MAX_HISTORY_INTERVAL_SECS}, got {}",
                self.simulation.history_interval_secs
            );
        }
        Ok(())
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.auth.jwt_secret == DEV_JWT_SECRET
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            enable_cors: true,
            cors_origin: "http://localhost:3000".to_string(),
            request_timeout_secs: 5,
        },
        auth: AuthConfig {
            jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
            token_ttl_minutes: 60,
        },
        simulation: SimulationConfig {
            initial_soc_percent: 65.0,
            random_seed: Some(42),
            default_scenario: Scenario::Normal,
            history_points: 30,
            history_interval_secs: 60,
        },
        activity: ActivityConfig { max_entries: 100 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        assert!(test_config().validate().is_ok());
        assert!(!test_config().uses_dev_secret());
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut cfg = test_config();
        cfg.auth.jwt_secret = "short".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_soc_out_of_range_rejected() {
        let mut cfg = test_config();
        cfg.simulation.initial_soc_percent = 120.0;
        assert!(cfg.validate().is_err());
    }

    #[rstest::rstest]
    #[case(0)]
    #[case(-5)]
    #[case(MAX_HISTORY_INTERVAL_SECS + 1)]
    #[case(i64::MAX)]
    fn test_history_interval_out_of_range_rejected(#[case] secs: i64) {
        let mut cfg = test_config();
        cfg.simulation.history_interval_secs = secs;
        assert!(cfg.validate().is_err());
    }

    #[rstest::rstest]
    #[case(0)]
    #[case(MAX_TOKEN_TTL_MINUTES + 1)]
    #[case(i64::MAX)]
    fn test_token_ttl_out_of_range_rejected(#[case] minutes: i64) {
        let mut cfg = test_config();
        cfg.auth.token_ttl_minutes = minutes;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let mut cfg = test_config();
        cfg.simulation.history_interval_secs = MAX_HISTORY_INTERVAL_SECS;
        cfg.auth.token_ttl_minutes = MAX_TOKEN_TTL_MINUTES;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let cfg = test_config();
        assert_eq!(cfg.server.socket_addr().unwrap().port(), 0);
    }
}
