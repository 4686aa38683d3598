use std::{sync::Arc, time::Duration};

use crate::config::Config;
use hifi_valuation::{ModelClient, OpenAiModelClient, ValuationService};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub valuation_service: Arc<ValuationService>,
    /// Upper bound on one valuation; `None` waits for the model indefinitely.
    pub request_timeout: Option<Duration>,
}

pub fn init_tracing() {
    let log_format = std::env::var("HV_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Build shared state backed by the OpenAI client.
pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let client = OpenAiModelClient::new(
        &config.openai_api_key,
        &config.valuation.model,
        config.valuation.temperature,
    )
    .map_err(anyhow::Error::new)?;
    tracing::info!(
        "Valuation model {} at temperature {} ({:?} output check)",
        client.model(),
        client.temperature(),
        config.valuation.schema_check
    );
    Ok(build_state_with_client(config, Arc::new(client)))
}

/// Build shared state around any model client (tests inject a fake here).
pub fn build_state_with_client(config: &Config, client: Arc<dyn ModelClient>) -> Arc<AppState> {
    let valuation_service = Arc::new(ValuationService::new(client, config.valuation.clone()));
    Arc::new(AppState {
        valuation_service,
        request_timeout: config.request_timeout,
    })
}
