use std::{net::SocketAddr, str::FromStr, time::Duration};

use hearth_core::constants::{DEFAULT_FORECAST_MONTHS, DEFAULT_PAST_CYCLE_COUNT};

const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_DB_PATH: &str = "hearth.db";

pub struct Config {
    pub listen_addr: SocketAddr,
    /// SQLite file; parent directories are created on startup.
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Default number of past cycles listed when a request gives none.
    pub past_cycle_count: usize,
    pub forecast_months: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unparseable values fall back
    /// to their defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr = parse_or(
            &lookup,
            "HEARTH_LISTEN_ADDR",
            SocketAddr::from(([0, 0, 0, 0], 8080)),
        );
        let cors_allow = lookup("HEARTH_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = parse_or(&lookup, "HEARTH_REQUEST_TIMEOUT_MS", DEFAULT_TIMEOUT_MS);
        let db_path = lookup("HEARTH_DB_PATH")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            past_cycle_count: parse_or(&lookup, "HEARTH_PAST_CYCLE_COUNT", DEFAULT_PAST_CYCLE_COUNT),
            forecast_months: parse_or(&lookup, "HEARTH_FORECAST_MONTHS", DEFAULT_FORECAST_MONTHS),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Invalid {}='{}', using default {}", key, raw, default);
                default
            }
        },
    }
}
