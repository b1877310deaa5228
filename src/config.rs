//! Application configuration read from environment variables at startup.
//!
//! Every knob has a default so the service starts with no environment at
//! all: in-memory store, built-in LLM transform, no character limit.

use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_PROJECT_FLUSH_INTERVAL_MS: u64 = 500;
pub const DEFAULT_TRANSFORM_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_AI_MAX_TOKENS: u32 = 2048;

/// Parse `key` from `var`, falling back to `default` when unset or malformed.
pub fn parse_var<T: FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    var(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_flag(var: &impl Fn(&str) -> Option<String>, key: &str) -> bool {
    var(key).is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

fn non_empty(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub flush_interval_ms: u64,
    pub static_dir: Option<String>,
    /// External transform endpoint. `None` routes assist requests through the LLM.
    pub transform_endpoint_url: Option<String>,
    pub transform_timeout_secs: u64,
    /// Enables the force-approve ethics transition.
    pub dev_approvals: bool,
    pub character_limit: Option<usize>,
    pub ai_max_tokens: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl AppConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[must_use]
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: parse_var(&var, "PORT", DEFAULT_PORT),
            database_url: non_empty(&var, "DATABASE_URL"),
            db_max_connections: parse_var(&var, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            flush_interval_ms: parse_var(&var, "PROJECT_FLUSH_INTERVAL_MS", DEFAULT_PROJECT_FLUSH_INTERVAL_MS),
            static_dir: non_empty(&var, "STATIC_DIR"),
            transform_endpoint_url: non_empty(&var, "TRANSFORM_ENDPOINT_URL"),
            transform_timeout_secs: parse_var(&var, "TRANSFORM_TIMEOUT_SECS", DEFAULT_TRANSFORM_TIMEOUT_SECS),
            dev_approvals: parse_flag(&var, "ENABLE_DEV_APPROVALS"),
            character_limit: var("EDITOR_CHARACTER_LIMIT")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|limit| *limit > 0),
            ai_max_tokens: parse_var(&var, "AI_MAX_TOKENS", DEFAULT_AI_MAX_TOKENS),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
