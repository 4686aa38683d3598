//! Valuation error types.

use thiserror::Error;

/// Errors raised while producing a valuation.
#[derive(Debug, Error)]
pub enum ValuationError {
    /// The request carried no usable `units` list.
    #[error("No units provided")]
    NoUnits,

    /// Missing API key for the model provider.
    #[error("Missing API key for provider {0}")]
    MissingApiKey(String),

    /// Provider error (from rig-core or the upstream API).
    #[error("Provider error: {0}")]
    Provider(String),
}

impl ValuationError {
    /// Create a new provider error.
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Stable code for programmatic handling and log fields.
    pub fn code(&self) -> &'static str {
        match self {
            ValuationError::NoUnits => "NO_UNITS",
            ValuationError::MissingApiKey(_) => "MISSING_API_KEY",
            ValuationError::Provider(_) => "PROVIDER_ERROR",
        }
    }

    /// Whether the caller is at fault (maps to a 4xx at the HTTP edge).
    pub fn is_client_error(&self) -> bool {
        matches!(self, ValuationError::NoUnits)
    }
}
