use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn parse_var_missing_returns_default() {
    let val: usize = parse_var(&lookup(&[]), "MISSING", 42);
    assert_eq!(val, 42);
}

#[test]
fn parse_var_present_valid() {
    let val: usize = parse_var(&lookup(&[("N", " 99 ")]), "N", 0);
    assert_eq!(val, 99);
}

#[test]
fn parse_var_present_invalid_returns_default() {
    let val: usize = parse_var(&lookup(&[("N", "notanumber")]), "N", 7);
    assert_eq!(val, 7);
}

#[test]
fn defaults_with_empty_environment() {
    let config = AppConfig::default();
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.database_url, None);
    assert_eq!(config.db_max_connections, DEFAULT_DB_MAX_CONNECTIONS);
    assert_eq!(config.flush_interval_ms, DEFAULT_PROJECT_FLUSH_INTERVAL_MS);
    assert_eq!(config.transform_endpoint_url, None);
    assert_eq!(config.transform_timeout_secs, DEFAULT_TRANSFORM_TIMEOUT_SECS);
    assert!(!config.dev_approvals);
    assert_eq!(config.character_limit, None);
    assert_eq!(config.ai_max_tokens, DEFAULT_AI_MAX_TOKENS);
}

#[test]
fn reads_every_variable() {
    let config = AppConfig::from_lookup(lookup(&[
        ("PORT", "8080"),
        ("DATABASE_URL", "postgres://localhost/studyflow"),
        ("DB_MAX_CONNECTIONS", "9"),
        ("PROJECT_FLUSH_INTERVAL_MS", "250"),
        ("STATIC_DIR", "dist"),
        ("TRANSFORM_ENDPOINT_URL", "http://ai.local/transform"),
        ("TRANSFORM_TIMEOUT_SECS", "5"),
        ("ENABLE_DEV_APPROVALS", "true"),
        ("EDITOR_CHARACTER_LIMIT", "5000"),
        ("AI_MAX_TOKENS", "512"),
    ]));
    assert_eq!(config.port, 8080);
    assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/studyflow"));
    assert_eq!(config.db_max_connections, 9);
    assert_eq!(config.flush_interval_ms, 250);
    assert_eq!(config.static_dir.as_deref(), Some("dist"));
    assert_eq!(config.transform_endpoint_url.as_deref(), Some("http://ai.local/transform"));
    assert_eq!(config.transform_timeout_secs, 5);
    assert!(config.dev_approvals);
    assert_eq!(config.character_limit, Some(5000));
    assert_eq!(config.ai_max_tokens, 512);
}

#[test]
fn blank_strings_are_unset() {
    let config = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "  "), ("TRANSFORM_ENDPOINT_URL", "")]));
    assert_eq!(config.database_url, None);
    assert_eq!(config.transform_endpoint_url, None);
}

#[test]
fn dev_approvals_flag_spellings() {
    for on in ["1", "true", "TRUE", "yes", "on"] {
        assert!(AppConfig::from_lookup(lookup(&[("ENABLE_DEV_APPROVALS", on)])).dev_approvals, "{on}");
    }
    for off in ["0", "false", "no", "maybe"] {
        assert!(!AppConfig::from_lookup(lookup(&[("ENABLE_DEV_APPROVALS", off)])).dev_approvals, "{off}");
    }
}

#[test]
fn zero_character_limit_means_unlimited() {
    let config = AppConfig::from_lookup(lookup(&[("EDITOR_CHARACTER_LIMIT", "0")]));
    assert_eq!(config.character_limit, None);
}
