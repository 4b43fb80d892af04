//! Gateway connection configuration.
//!
//! Maps to `llmgate.toml`:
//!
//! ```toml
//! api_key = "sk-1234"
//! temperature = 0.7
//! url = "http://localhost:4000"
//!
//! [targets.llm]
//! timeout_ms = 120000
//! retry_interval_ms = 1000
//! retry_max_attempts = 3
//! retry_backoff_rate = 2.0
//! ```
//!
//! Omitted sections fall back to per-target defaults. [`ConfigLoader`]
//! parses and then runs its [`ConfigValidator`]; the bare `from_toml`
//! constructors only parse.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CoreError, Result};

/// Top-level gateway configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Bearer token for the gateway.
    #[serde(default)]
    pub api_key: String,
    /// Default sampling temperature when a request names none.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Gateway base URL.
    #[serde(default = "default_url")]
    pub url: String,
    /// Per-endpoint-group timeouts and retry policies.
    #[serde(default)]
    pub targets: Targets,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            temperature: default_temperature(),
            url: default_url(),
            targets: Targets::default(),
        }
    }
}

impl GatewayConfig {
    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `CoreError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Parse configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// The parsed base URL.
    ///
    /// # Errors
    /// Returns `CoreError::Config` if `url` does not parse.
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.url).map_err(|e| CoreError::Config(format!("url: {e}")))
    }

    /// Settings for one endpoint group.
    #[must_use]
    pub fn target(&self, name: TargetName) -> &Target {
        self.targets.get(name)
    }
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// Endpoint groups, each with its own timeout and retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetName {
    /// Model discovery.
    System,
    /// Completions, embeddings, token counting and audio.
    Llm,
    /// MCP tool listing and execution.
    Mcp,
}

impl TargetName {
    /// Lower-case name; also sent as the request user agent.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Llm => "llm",
            Self::Mcp => "mcp",
        }
    }

    /// Every group, in declaration order.
    pub const ALL: [Self; 3] = [Self::System, Self::Llm, Self::Mcp];
}

impl fmt::Display for TargetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for all endpoint groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Targets {
    /// Model discovery endpoints.
    #[serde(default = "Target::system_default")]
    pub system: Target,
    /// Model-invoking endpoints.
    #[serde(default = "Target::llm_default")]
    pub llm: Target,
    /// MCP endpoints.
    #[serde(default = "Target::mcp_default")]
    pub mcp: Target,
}

impl Default for Targets {
    fn default() -> Self {
        Self {
            system: Target::system_default(),
            llm: Target::llm_default(),
            mcp: Target::mcp_default(),
        }
    }
}

impl Targets {
    /// Settings for `name`.
    #[must_use]
    pub fn get(&self, name: TargetName) -> &Target {
        match name {
            TargetName::System => &self.system,
            TargetName::Llm => &self.llm,
            TargetName::Mcp => &self.mcp,
        }
    }
}

/// Timeout and retry policy of one endpoint group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Per-attempt timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
    /// Total attempts, including the first.
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,
    /// Multiplier applied to the delay after each retry.
    #[serde(default = "default_retry_backoff_rate")]
    pub retry_backoff_rate: f64,
}

impl Target {
    fn with_timeout(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            retry_interval_ms: default_retry_interval_ms(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_backoff_rate: default_retry_backoff_rate(),
        }
    }

    fn system_default() -> Self {
        Self::with_timeout(10_000)
    }

    fn llm_default() -> Self {
        Self::with_timeout(120_000)
    }

    fn mcp_default() -> Self {
        Self::with_timeout(60_000)
    }

    /// Per-attempt timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Initial retry delay.
    #[must_use]
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::with_timeout(default_timeout_ms())
    }
}

fn default_temperature() -> f32 {
    0.7
}
fn default_url() -> String {
    "http://localhost:4000".to_string()
}
fn default_timeout_ms() -> u64 {
    30_000
}
fn default_retry_interval_ms() -> u64 {
    500
}
fn default_retry_max_attempts() -> u32 {
    3
}
fn default_retry_backoff_rate() -> f64 {
    2.0
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Checks a [`GatewayConfig`] and reports every violation at once.
#[derive(Debug, Clone)]
pub struct ConfigValidator {
    require_api_key: bool,
    max_temperature: f32,
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self {
            require_api_key: true,
            max_temperature: 2.0,
        }
    }
}

impl ConfigValidator {
    /// Validator with the default rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept an empty API key, for gateways running without auth.
    #[must_use]
    pub fn allow_missing_api_key(mut self) -> Self {
        self.require_api_key = false;
        self
    }

    /// Validate `config`.
    ///
    /// # Errors
    /// Returns `CoreError::Config` listing all violations, separated by `"; "`.
    pub fn validate(&self, config: &GatewayConfig) -> Result<()> {
        let mut errors = Vec::new();

        if self.require_api_key && config.api_key.trim().is_empty() {
            errors.push("api_key is required".to_string());
        }

        if !(0.0..=self.max_temperature).contains(&config.temperature) {
            errors.push(format!(
                "temperature must be between 0 and {}, got {}",
                self.max_temperature, config.temperature
            ));
        }

        match Url::parse(&config.url) {
            Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => {}
            Ok(_) => errors.push(format!("url {:?} has no host", config.url)),
            Err(e) => errors.push(format!("url {:?} is invalid: {e}", config.url)),
        }

        for name in TargetName::ALL {
            Self::validate_target(name, config.targets.get(name), &mut errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Config(errors.join("; ")))
        }
    }

    fn validate_target(name: TargetName, target: &Target, errors: &mut Vec<String>) {
        if target.timeout_ms == 0 {
            errors.push(format!("targets.{name}.timeout_ms must be non-zero"));
        }
        if target.retry_interval_ms == 0 {
            errors.push(format!("targets.{name}.retry_interval_ms must be non-zero"));
        }
        if target.retry_max_attempts == 0 {
            errors.push(format!("targets.{name}.retry_max_attempts must be non-zero"));
        }
        if target.retry_backoff_rate.is_nan() || target.retry_backoff_rate <= 0.0 {
            errors.push(format!("targets.{name}.retry_backoff_rate must be positive"));
        }
    }
}

/// Parses configuration and validates it with an owned [`ConfigValidator`].
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    validator: ConfigValidator,
}

impl ConfigLoader {
    /// Loader with the default validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader with a custom validator.
    #[must_use]
    pub fn with_validator(validator: ConfigValidator) -> Self {
        Self { validator }
    }

    /// The validator in use.
    #[must_use]
    pub fn validator(&self) -> &ConfigValidator {
        &self.validator
    }

    /// Parse and validate a TOML string.
    ///
    /// # Errors
    /// Returns `CoreError::Config` on parse or validation failure.
    pub fn load_str(&self, toml_str: &str) -> Result<GatewayConfig> {
        let config = GatewayConfig::from_toml(toml_str)?;
        self.validator.validate(&config)?;
        Ok(config)
    }

    /// Parse and validate a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load_file(&self, path: &Path) -> Result<GatewayConfig> {
        let config = GatewayConfig::from_file(path)?;
        self.validator.validate(&config)?;
        tracing::debug!(path = %path.display(), url = %config.url, "Loaded gateway config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_sections() {
        let config = GatewayConfig::from_toml("api_key = \"sk-1\"").unwrap();
        assert_eq!(config.url, "http://localhost:4000");
        assert_eq!(config.targets.llm.timeout(), Duration::from_secs(120));
        assert_eq!(config.targets.system.retry_max_attempts, 3);
        assert!(ConfigValidator::new().validate(&config).is_ok());
    }

    #[test]
    fn partial_target_keeps_other_defaults() {
        let config = GatewayConfig::from_toml(
            r#"
            api_key = "sk-1"
            [targets.mcp]
            timeout_ms = 5000
            "#,
        )
        .unwrap();
        assert_eq!(config.target(TargetName::Mcp).timeout_ms, 5000);
        assert_eq!(config.target(TargetName::Mcp).retry_interval(), Duration::from_millis(500));
    }

    #[test]
    fn invalid_toml_is_config_error() {
        assert!(matches!(GatewayConfig::from_toml("api_key = ["), Err(CoreError::Config(_))));
    }

    #[test]
    fn validator_collects_all_violations() {
        let mut config = GatewayConfig {
            url: "localhost".into(),
            ..GatewayConfig::default()
        };
        config.targets.llm.retry_max_attempts = 0;
        config.targets.mcp.retry_backoff_rate = 0.0;

        let Err(CoreError::Config(msg)) = ConfigValidator::new().validate(&config) else {
            panic!("expected config error");
        };
        assert!(msg.contains("api_key"));
        assert!(msg.contains("url"));
        assert!(msg.contains("targets.llm.retry_max_attempts"));
        assert!(msg.contains("targets.mcp.retry_backoff_rate"));
    }

    #[test]
    fn url_without_host_rejected() {
        let config = GatewayConfig {
            api_key: "k".into(),
            url: "file:///tmp/x".into(),
            ..GatewayConfig::default()
        };
        assert!(ConfigValidator::new().validate(&config).is_err());
    }

    #[test]
    fn missing_api_key_allowed_when_configured() {
        let loader = ConfigLoader::with_validator(ConfigValidator::new().allow_missing_api_key());
        assert!(loader.load_str("url = \"https://gw.example.com\"").is_ok());
        assert!(ConfigLoader::new().load_str("url = \"https://gw.example.com\"").is_err());
    }
}
