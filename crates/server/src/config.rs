//! Server configuration

use std::time::Duration;

/// Requests per second allowed on the API routes when `RATE_LIMIT_RPS` is unset
pub const DEFAULT_RATE_LIMIT_RPS: u32 = 100;

/// Inactivity after which a login session is dropped, when `SESSION_IDLE_TIMEOUT_SECS` is unset
pub const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Server configuration loaded from environment variables
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub cors_origins: Vec<String>,
    pub rate_limit_rps: u32,
    pub session_idle_timeout: Duration,
    /// Enables the Claude-backed responder for open-domain chat turns
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "host=localhost user=postgres dbname=clinic".into()),
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            cors_origins: parse_origins(&std::env::var("CORS_ORIGINS").unwrap_or_default()),
            rate_limit_rps: parse_rate_limit(std::env::var("RATE_LIMIT_RPS").ok().as_deref()),
            session_idle_timeout: parse_idle_timeout(
                std::env::var("SESSION_IDLE_TIMEOUT_SECS").ok().as_deref(),
            ),
            anthropic_api_key: non_empty_var("ANTHROPIC_API_KEY"),
            anthropic_model: non_empty_var("ANTHROPIC_MODEL"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Split a comma-separated origin list; empty means any origin
fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        vec!["*".to_string()]
    } else {
        origins
    }
}

fn parse_rate_limit(raw: Option<&str>) -> u32 {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|rps| *rps > 0)
        .unwrap_or(DEFAULT_RATE_LIMIT_RPS)
}

fn parse_idle_timeout(raw: Option<&str>) -> Duration {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_SESSION_IDLE_TIMEOUT)
}
