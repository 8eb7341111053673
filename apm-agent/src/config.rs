//! Agent configuration.
//!
//! Built programmatically through `with_*` methods or from the process
//! environment via [`Config::from_env`]. Unparseable environment values fall
//! back to their defaults with a warning rather than failing agent start-up.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Whether the agent records and ships anything at all.
pub(crate) const APM_ENABLED: &str = "APM_ENABLED";
/// Base URL of the collector.
pub(crate) const APM_SERVER_URL: &str = "APM_SERVER_URL";
/// Default collector URL.
pub(crate) const APM_SERVER_URL_DEFAULT: &str = "http://localhost:8200";
/// Secret token credential.
pub(crate) const APM_SECRET_TOKEN: &str = "APM_SECRET_TOKEN";
/// API key credential, used when no secret token is configured.
pub(crate) const APM_API_KEY: &str = "APM_API_KEY";
/// Probability that a transaction is sampled.
pub(crate) const APM_SAMPLE_RATE: &str = "APM_SAMPLE_RATE";
/// Queued-record count that triggers an automatic flush.
pub(crate) const APM_FLUSH_THRESHOLD: &str = "APM_FLUSH_THRESHOLD";
/// Default automatic flush threshold.
pub(crate) const APM_FLUSH_THRESHOLD_DEFAULT: usize = 100;
/// Cap on spans recorded per transaction.
pub(crate) const APM_TRANSACTION_MAX_SPANS: &str = "APM_TRANSACTION_MAX_SPANS";
/// Default per-transaction span cap.
pub(crate) const APM_TRANSACTION_MAX_SPANS_DEFAULT: usize = 500;
/// Logical name of the monitored service.
pub(crate) const APM_SERVICE_NAME: &str = "APM_SERVICE_NAME";
/// Default service name.
pub(crate) const APM_SERVICE_NAME_DEFAULT: &str = "unknown-rust-service";
/// Version of the monitored service.
pub(crate) const APM_SERVICE_VERSION: &str = "APM_SERVICE_VERSION";
/// Deployment environment of the monitored service.
pub(crate) const APM_ENVIRONMENT: &str = "APM_ENVIRONMENT";

const SERVER_TIMEOUT_DEFAULT: Duration = Duration::from_secs(2);
const CONNECT_TIMEOUT_DEFAULT: Duration = Duration::from_secs(1);

/// Agent configuration shared by the tracer and the sender.
#[derive(Clone, Debug)]
pub struct Config {
    enabled: bool,
    server_url: String,
    secret_token: Option<String>,
    api_key: Option<String>,
    sample_rate: f64,
    flush_threshold: usize,
    transaction_max_spans: usize,
    service_name: String,
    service_version: Option<String>,
    environment: Option<String>,
    server_timeout: Duration,
    connect_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            enabled: true,
            server_url: APM_SERVER_URL_DEFAULT.to_string(),
            secret_token: None,
            api_key: None,
            sample_rate: 1.0,
            flush_threshold: APM_FLUSH_THRESHOLD_DEFAULT,
            transaction_max_spans: APM_TRANSACTION_MAX_SPANS_DEFAULT,
            service_name: APM_SERVICE_NAME_DEFAULT.to_string(),
            service_version: None,
            environment: None,
            server_timeout: SERVER_TIMEOUT_DEFAULT,
            connect_timeout: CONNECT_TIMEOUT_DEFAULT,
        }
    }
}

impl Config {
    /// Configuration with all defaults: enabled, sampling everything,
    /// shipping to a local collector.
    pub fn new() -> Self {
        Config::default()
    }

    /// Read configuration from `APM_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        if let Some(enabled) = read_env(APM_ENABLED) {
            config.enabled = enabled;
        }
        if let Ok(url) = env::var(APM_SERVER_URL) {
            config.server_url = url;
        }
        config.secret_token = env::var(APM_SECRET_TOKEN).ok().filter(|t| !t.is_empty());
        config.api_key = env::var(APM_API_KEY).ok().filter(|k| !k.is_empty());
        if let Some(rate) = read_env(APM_SAMPLE_RATE) {
            config.sample_rate = clamp_sample_rate(rate);
        }
        if let Some(threshold) = read_env(APM_FLUSH_THRESHOLD) {
            config.flush_threshold = threshold;
        }
        if let Some(max_spans) = read_env(APM_TRANSACTION_MAX_SPANS) {
            config.transaction_max_spans = max_spans;
        }
        if let Ok(name) = env::var(APM_SERVICE_NAME) {
            if !name.is_empty() {
                config.service_name = name;
            }
        }
        config.service_version = env::var(APM_SERVICE_VERSION).ok().filter(|v| !v.is_empty());
        config.environment = env::var(APM_ENVIRONMENT).ok().filter(|e| !e.is_empty());
        config
    }

    /// Enable or disable the agent.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the collector base URL.
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    /// Set the secret-token credential.
    pub fn with_secret_token(mut self, token: impl Into<String>) -> Self {
        self.secret_token = Some(token.into());
        self
    }

    /// Set the API-key credential.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the sampling probability, clamped to `0.0..=1.0`.
    pub fn with_sample_rate(mut self, rate: f64) -> Self {
        self.sample_rate = clamp_sample_rate(rate);
        self
    }

    /// Set the queued-record count that triggers an automatic flush.
    pub fn with_flush_threshold(mut self, threshold: usize) -> Self {
        self.flush_threshold = threshold;
        self
    }

    /// Cap the number of spans recorded per transaction.
    pub fn with_transaction_max_spans(mut self, max_spans: usize) -> Self {
        self.transaction_max_spans = max_spans;
        self
    }

    /// Set the logical service name reported in metadata.
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Set the service version reported in metadata.
    pub fn with_service_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = Some(version.into());
        self
    }

    /// Set the deployment environment reported in metadata.
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Whether the agent records and ships anything at all.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// The collector base URL.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// The secret-token credential, if configured.
    pub fn secret_token(&self) -> Option<&str> {
        self.secret_token.as_deref()
    }

    /// The API-key credential, if configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// The sampling probability.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// The queued-record count that triggers an automatic flush.
    pub fn flush_threshold(&self) -> usize {
        self.flush_threshold
    }

    /// The per-transaction span cap.
    pub fn transaction_max_spans(&self) -> usize {
        self.transaction_max_spans
    }

    /// The logical service name.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// The service version, if configured.
    pub fn service_version(&self) -> Option<&str> {
        self.service_version.as_deref()
    }

    /// The deployment environment, if configured.
    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    /// Total time budget for one send, connection included.
    pub fn server_timeout(&self) -> Duration {
        self.server_timeout
    }

    /// Time budget for establishing the connection.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

fn clamp_sample_rate(rate: f64) -> f64 {
    if !(0.0..=1.0).contains(&rate) {
        warn!(rate, "sample rate outside 0.0..=1.0, clamping");
    }
    rate.clamp(0.0, 1.0)
}

fn read_env<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(name, value = raw.as_str(), "unparseable value, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::new();
        assert!(config.enabled());
        assert_eq!(config.server_url(), APM_SERVER_URL_DEFAULT);
        assert_eq!(config.sample_rate(), 1.0);
        assert_eq!(config.flush_threshold(), APM_FLUSH_THRESHOLD_DEFAULT);
        assert_eq!(
            config.transaction_max_spans(),
            APM_TRANSACTION_MAX_SPANS_DEFAULT
        );
        assert_eq!(config.service_name(), APM_SERVICE_NAME_DEFAULT);
        assert_eq!(config.server_timeout(), Duration::from_secs(2));
        assert_eq!(config.connect_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn sample_rate_is_clamped() {
        assert_eq!(Config::new().with_sample_rate(7.5).sample_rate(), 1.0);
        assert_eq!(Config::new().with_sample_rate(-0.5).sample_rate(), 0.0);
        assert_eq!(Config::new().with_sample_rate(0.25).sample_rate(), 0.25);
    }

    #[test]
    fn from_env_reads_the_documented_variables() {
        temp_env::with_vars(
            [
                (APM_ENABLED, Some("false")),
                (APM_SERVER_URL, Some("https://apm.example.com:8200")),
                (APM_SECRET_TOKEN, Some("s3cr3t")),
                (APM_SAMPLE_RATE, Some("0.5")),
                (APM_FLUSH_THRESHOLD, Some("10")),
                (APM_SERVICE_NAME, Some("billing")),
                (APM_ENVIRONMENT, Some("production")),
            ],
            || {
                let config = Config::from_env();
                assert!(!config.enabled());
                assert_eq!(config.server_url(), "https://apm.example.com:8200");
                assert_eq!(config.secret_token(), Some("s3cr3t"));
                assert_eq!(config.api_key(), None);
                assert_eq!(config.sample_rate(), 0.5);
                assert_eq!(config.flush_threshold(), 10);
                assert_eq!(config.service_name(), "billing");
                assert_eq!(config.environment(), Some("production"));
            },
        );
    }

    #[test]
    fn from_env_falls_back_on_unparseable_values() {
        temp_env::with_vars(
            [
                (APM_SAMPLE_RATE, Some("lots")),
                (APM_FLUSH_THRESHOLD, Some("-3")),
            ],
            || {
                let config = Config::from_env();
                assert_eq!(config.sample_rate(), 1.0);
                assert_eq!(config.flush_threshold(), APM_FLUSH_THRESHOLD_DEFAULT);
            },
        );
    }
}
