//! Process configuration
//!
//! Read from environment variables (a `.env` file is loaded by the binary
//! first):
//!
//! ```bash
//! TELEMETRY_HOST=0.0.0.0
//! PORT=3001
//! TELEMETRY_ENV=development
//! TELEMETRY_FRONTEND_URL=http://localhost:3000
//! TELEMETRY_INGEST_INTERVAL_MS=300000
//! TELEMETRY_HEARTBEAT_INTERVAL_MS=30000
//! ```

use std::time::Duration;

use crate::types::ConfigError;

/// Default ingestion period (5 minutes)
pub const DEFAULT_INGEST_INTERVAL: Duration = Duration::from_millis(300_000);

/// Default heartbeat period (30 seconds)
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(30_000);

/// Default listen port
pub const DEFAULT_PORT: u16 = 3001;

/// Runtime configuration for the scheduler, the hub and the HTTP server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub host: String,
    pub port: u16,
    /// Free-form environment label reported by `/health`
    pub environment: String,
    /// Allowed CORS origin; any origin when unset
    pub frontend_url: Option<String>,
    pub ingest_interval: Duration,
    pub heartbeat_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            environment: "development".to_string(),
            frontend_url: None,
            ingest_interval: DEFAULT_INGEST_INTERVAL,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
        }
    }
}

impl PipelineConfig {
    /// Create from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Create from an arbitrary variable lookup; unset variables keep defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("TELEMETRY_HOST").filter(|h| !h.trim().is_empty()) {
            config.host = host.trim().to_string();
        }
        if let Some(raw) = lookup("PORT") {
            config.port = parse_number("PORT", &raw)?;
        }
        if let Some(env) = lookup("TELEMETRY_ENV").filter(|e| !e.trim().is_empty()) {
            config.environment = env.trim().to_string();
        }
        config.frontend_url = lookup("TELEMETRY_FRONTEND_URL")
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        if let Some(raw) = lookup("TELEMETRY_INGEST_INTERVAL_MS") {
            config.ingest_interval = parse_interval("TELEMETRY_INGEST_INTERVAL_MS", &raw)?;
        }
        if let Some(raw) = lookup("TELEMETRY_HEARTBEAT_INTERVAL_MS") {
            config.heartbeat_interval = parse_interval("TELEMETRY_HEARTBEAT_INTERVAL_MS", &raw)?;
        }

        Ok(config)
    }

    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: raw.to_string(),
    })
}

fn parse_interval(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    let millis: u64 = parse_number(var, raw)?;
    if millis == 0 {
        return Err(ConfigError::ZeroInterval { var });
    }
    Ok(Duration::from_millis(millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = PipelineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.ingest_interval, Duration::from_millis(300_000));
        assert_eq!(config.heartbeat_interval, Duration::from_millis(30_000));
        assert_eq!(config.bind_addr(), "0.0.0.0:3001");
    }

    #[test]
    fn test_overrides() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("TELEMETRY_HOST", "127.0.0.1"),
            ("TELEMETRY_ENV", "production"),
            ("TELEMETRY_FRONTEND_URL", "http://localhost:3000"),
            ("TELEMETRY_INGEST_INTERVAL_MS", "1000"),
            ("TELEMETRY_HEARTBEAT_INTERVAL_MS", "250"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.environment, "production");
        assert_eq!(config.frontend_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(config.ingest_interval, Duration::from_secs(1));
        assert_eq!(config.heartbeat_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_port() {
        let err = PipelineConfig::from_lookup(lookup_from(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { var: "PORT", .. }));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = PipelineConfig::from_lookup(lookup_from(&[("TELEMETRY_HEARTBEAT_INTERVAL_MS", "0")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::ZeroInterval {
                var: "TELEMETRY_HEARTBEAT_INTERVAL_MS"
            }
        );
    }

    #[test]
    fn test_blank_frontend_url_is_unset() {
        let config = PipelineConfig::from_lookup(lookup_from(&[("TELEMETRY_FRONTEND_URL", "  ")])).unwrap();
        assert_eq!(config.frontend_url, None);
    }
}
