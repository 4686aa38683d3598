use std::{net::SocketAddr, time::Duration};

use anyhow::{anyhow, Context};
use hifi_valuation::{SchemaCheck, ValuationConfig, DEFAULT_MODEL, DEFAULT_TEMPERATURE};

pub struct Config {
    pub listen_addr: SocketAddr,
    pub openai_api_key: String,
    pub valuation: ValuationConfig,
    pub cors_allow: Vec<String>,
    /// Whole-request timeout; `None` leaves the model call unbounded.
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    ///
    /// Fails when `OPENAI_API_KEY` is missing or empty.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let openai_api_key = lookup("OPENAI_API_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| anyhow!("OPENAI_API_KEY not set"))?;

        let listen_addr: SocketAddr = lookup("HV_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:5000".to_string())
            .parse()
            .context("Invalid HV_LISTEN_ADDR")?;

        let model = lookup("HV_MODEL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let temperature = lookup("HV_TEMPERATURE")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(DEFAULT_TEMPERATURE);
        let schema_check = match lookup("HV_STRICT_SCHEMA") {
            Some(v) if is_truthy(&v) => SchemaCheck::Strict,
            _ => SchemaCheck::Passthrough,
        };

        let cors_allow = lookup("HV_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let request_timeout = lookup("HV_REQUEST_TIMEOUT_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        Ok(Self {
            listen_addr,
            openai_api_key,
            valuation: ValuationConfig {
                model,
                temperature,
                schema_check,
            },
            cors_allow,
            request_timeout,
        })
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
