//! Configuration loader. Merges env vars, .env file, and config.toml.

use std::path::{Path, PathBuf};

use common::Error;
use serde::{Deserialize, Serialize};
use suitability::{PolicyPreset, ScoringPolicy};

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS. Empty or `*` allows any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub scoring: ScoringPolicy,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    3001
}
fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: Vec::new(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o.trim() == "*")
    }
}

// ── Parsing helpers ───────────────────────────────────────────────────

fn parse_non_negative_f64(raw: &str, env_name: &str) -> Result<f64, Error> {
    let parsed = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::Config(format!("{env_name} must be a number >= 0")))?;
    if !parsed.is_finite() || parsed < 0.0 {
        return Err(Error::Config(format!("{env_name} must be a number >= 0")));
    }
    Ok(parsed)
}

fn parse_positive_usize(raw: &str, env_name: &str) -> Result<usize, Error> {
    let parsed = raw
        .trim()
        .parse::<usize>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn parse_port(raw: &str) -> Result<u16, Error> {
    raw.trim()
        .parse::<u16>()
        .map_err(|_| Error::Config("PORT must be an integer in 1..=65535".into()))
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

fn validate_config(config: &ServiceConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.server.host.trim().is_empty() {
        issues.push("server.host must not be empty".into());
    }
    if config.server.port == 0 {
        issues.push("server.port must be > 0".into());
    }
    if config.server.max_body_bytes == 0 {
        issues.push("server.max_body_bytes must be > 0".into());
    }
    issues.extend(config.scoring.validation_issues());

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Parse a config.toml body. Missing sections fall back to defaults.
pub fn parse_config(contents: &str) -> Result<ServiceConfig, Error> {
    toml::from_str(contents)
        .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))
}

/// Apply environment overrides. `lookup` returns the raw value of a variable.
fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F) -> Result<(), Error>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("HOST") {
        config.server.host = host.trim().to_string();
    }
    if let Some(raw) = lookup("PORT") {
        config.server.port = parse_port(&raw)?;
    }
    if let Some(raw) = lookup("ALLOWED_ORIGINS") {
        config.server.allowed_origins = parse_origins(&raw);
    }
    if let Some(raw) = lookup("MAX_BODY_BYTES") {
        config.server.max_body_bytes = parse_positive_usize(&raw, "MAX_BODY_BYTES")?;
    }

    // A preset replaces the whole policy; the finer overrides below still apply.
    if let Some(raw) = lookup("SCORING_PRESET") {
        let preset = PolicyPreset::parse(&raw).ok_or_else(|| {
            Error::Config("SCORING_PRESET must be one of: extended, proportional".into())
        })?;
        config.scoring = ScoringPolicy::from_preset(preset);
    }
    if let Some(raw) = lookup("HARD_FAIL_MIN_ROI") {
        config.scoring.hard_fail_min_roi = parse_non_negative_f64(&raw, "HARD_FAIL_MIN_ROI")?;
    }
    if let Some(raw) = lookup("PENALTY_CAP") {
        config.scoring.penalty_cap = parse_non_negative_f64(&raw, "PENALTY_CAP")?;
    }
    Ok(())
}

fn config_path() -> PathBuf {
    std::env::var("TRADE_SCORER_CONFIG")
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// Load service configuration from environment and optional config file.
pub fn load_config() -> Result<ServiceConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = ServiceConfig::default();

    // 3. Try loading config.toml if it exists.
    let path = config_path();
    if Path::new(&path).exists() {
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        config = parse_config(&contents)?;
        tracing::debug!("Loaded config from {}", path.display());
    }

    // 4. Override with environment variables (highest priority).
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

    // 5. Validate.
    validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use suitability::Falloff;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn apply(config: &mut ServiceConfig, vars: &HashMap<String, String>) -> Result<(), Error> {
        apply_env_overrides(config, |name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.server.max_body_bytes, 1024 * 1024);
        assert!(config.server.allows_any_origin());
        assert_eq!(config.scoring, ScoringPolicy::extended());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = parse_config(
            r#"
            [server]
            port = 8080
            allowed_origins = ["http://localhost:5173"]

            [scoring]
            penalty_cap = 10.0
            falloff = "linear"

            [scoring.weights]
            roi = 40.0
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(!config.server.allows_any_origin());
        assert_eq!(config.scoring.penalty_cap, 10.0);
        assert_eq!(config.scoring.falloff, Falloff::Linear);
        assert_eq!(config.scoring.weights.roi, 40.0);
        assert_eq!(config.scoring.weights.delta, 25.0);
        assert!(config.scoring.hard_fail_enabled);
    }

    #[test]
    fn test_parse_rejects_bad_toml() {
        let err = parse_config("[server]\nport = \"eighty\"").unwrap_err();
        assert!(err.to_string().contains("Failed to parse config.toml"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServiceConfig::default();
        let vars = env(&[
            ("HOST", " 127.0.0.1 "),
            ("PORT", "9000"),
            ("ALLOWED_ORIGINS", "http://a.test, http://b.test,"),
            ("SCORING_PRESET", "proportional"),
            ("HARD_FAIL_MIN_ROI", "0.25"),
        ]);
        apply(&mut config, &vars).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.server.allowed_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(!config.scoring.hard_fail_enabled);
        assert_eq!(config.scoring.penalty_cap, 0.0);
        assert_eq!(config.scoring.hard_fail_min_roi, 0.25);
    }

    #[test]
    fn test_env_override_errors() {
        for (name, value) in [
            ("PORT", "not-a-port"),
            ("MAX_BODY_BYTES", "0"),
            ("SCORING_PRESET", "yolo"),
            ("PENALTY_CAP", "-1"),
            ("HARD_FAIL_MIN_ROI", "NaN"),
        ] {
            let mut config = ServiceConfig::default();
            let result = apply(&mut config, &env(&[(name, value)]));
            match result {
                Err(Error::Config(msg)) => assert!(msg.contains(name), "{}", msg),
                other => panic!("{}={} should fail, got {:?}", name, value, other),
            }
        }
    }

    #[test]
    fn test_validate_collects_every_issue() {
        let mut config = ServiceConfig::default();
        config.server.port = 0;
        config.server.max_body_bytes = 0;
        config.scoring.weights.beta = -5.0;

        let msg = validate_config(&config).unwrap_err().to_string();
        assert!(msg.contains("server.port"));
        assert!(msg.contains("server.max_body_bytes"));
        assert!(msg.contains("scoring.weights.beta"));
    }

    #[test]
    fn test_wildcard_origin_is_permissive() {
        let server = ServerConfig {
            allowed_origins: vec!["*".into()],
            ..Default::default()
        };
        assert!(server.allows_any_origin());
    }
}
