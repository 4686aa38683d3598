//! Hi-fi valuation: prompt construction and model-output handling.
//!
//! # Architecture
//!
//! - `prompt`: Fixed dealer instruction template and disclaimer
//! - `types`: Request extraction, requested response shape, outcomes
//! - `client`: `ModelClient` seam with the rig-core OpenAI client and a fake
//! - `service`: One valuation round trip (prompt, single call, JSON decode)
//! - `error`: Valuation errors
//!
//! # Example
//!
//! ```ignore
//! use hifi_valuation::{OpenAiModelClient, ValuationConfig, ValuationService};
//!
//! let config = ValuationConfig::default();
//! let client = OpenAiModelClient::new(&api_key, &config.model, config.temperature)?;
//! let service = ValuationService::new(Arc::new(client), config);
//!
//! match service.value_json(&body).await? {
//!     ValuationOutcome::Parsed(value) => respond_ok(value),
//!     ValuationOutcome::InvalidJson { raw } => respond_error(raw),
//!     ValuationOutcome::SchemaMismatch { raw, .. } => respond_error(raw),
//! }
//! ```

pub mod client;
pub mod error;
pub mod prompt;
pub mod service;
pub mod types;

// Re-export main types for convenience
pub use client::{FakeModelClient, ModelClient, OpenAiModelClient, RecordedCall};
pub use error::ValuationError;
pub use prompt::{build_prompt, DEFAULT_COUNTRY, DISCLAIMER, SYSTEM_INSTRUCTION};
pub use service::{
    SchemaCheck, ValuationConfig, ValuationService, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
};
pub use types::{
    ConfidenceLevel, UnitValuation, ValuationOutcome, ValuationRequest, ValuationResponse,
};
