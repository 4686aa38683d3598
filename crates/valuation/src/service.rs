//! Valuation service: prompt, one model round trip, JSON decode.

use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;

use crate::client::ModelClient;
use crate::error::ValuationError;
use crate::prompt::{build_prompt, DISCLAIMER, SYSTEM_INSTRUCTION};
use crate::types::{ValuationOutcome, ValuationRequest, ValuationResponse};

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.4;

/// How decoded model output is checked before it is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaCheck {
    /// Any valid JSON is returned unchanged.
    #[default]
    Passthrough,
    /// Decoded JSON must fit [`ValuationResponse`] and carry the exact
    /// disclaimer when one is present.
    Strict,
}

/// Process-wide valuation settings, fixed at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationConfig {
    /// Model identifier sent to the provider.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    pub schema_check: SchemaCheck,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            schema_check: SchemaCheck::Passthrough,
        }
    }
}

/// Produces valuations through an injected [`ModelClient`].
pub struct ValuationService {
    client: Arc<dyn ModelClient>,
    config: ValuationConfig,
}

impl ValuationService {
    pub fn new(client: Arc<dyn ModelClient>, config: ValuationConfig) -> Self {
        Self { client, config }
    }

    /// Validate a raw JSON body and value the units it carries.
    ///
    /// Shape errors return [`ValuationError::NoUnits`] before any outbound call.
    pub async fn value_json(&self, body: &Value) -> Result<ValuationOutcome, ValuationError> {
        let request = ValuationRequest::from_json(body)?;
        self.value_units(&request).await
    }

    /// Run one valuation round trip.
    ///
    /// Provider failures are returned as-is; they are not retried.
    pub async fn value_units(
        &self,
        request: &ValuationRequest,
    ) -> Result<ValuationOutcome, ValuationError> {
        if request.units.is_empty() {
            return Err(ValuationError::NoUnits);
        }

        debug!(
            "Valuing {} unit(s) for {} (sales text: {})",
            request.units.len(),
            request.country,
            request.include_sales
        );

        let prompt = build_prompt(&request.units, &request.country, request.include_sales);
        let reply = self.client.complete(SYSTEM_INSTRUCTION, &prompt).await?;

        Ok(self.decode(reply.trim()))
    }

    fn decode(&self, raw: &str) -> ValuationOutcome {
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Model returned invalid JSON: {}", e);
                return ValuationOutcome::InvalidJson {
                    raw: raw.to_string(),
                };
            }
        };

        if self.config.schema_check == SchemaCheck::Strict {
            if let Err(reason) = check_schema(&value) {
                warn!("Model output did not match valuation schema: {}", reason);
                return ValuationOutcome::SchemaMismatch {
                    raw: raw.to_string(),
                    reason,
                };
            }
        }

        ValuationOutcome::Parsed(value)
    }
}

fn check_schema(value: &Value) -> Result<(), String> {
    let response: ValuationResponse =
        serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;
    match response.disclaimer.as_deref() {
        Some(disclaimer) if disclaimer != DISCLAIMER => {
            Err("disclaimer does not match the required text".to_string())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FakeModelClient;
    use serde_json::json;

    fn service(client: Arc<FakeModelClient>, schema_check: SchemaCheck) -> ValuationService {
        ValuationService::new(
            client,
            ValuationConfig {
                schema_check,
                ..ValuationConfig::default()
            },
        )
    }

    fn valid_reply() -> Value {
        json!({
            "units": [{
                "unit_name": "Naim NAIT 2",
                "estimated_value": "£400–£500",
                "confidence_level": "high",
                "context": "Widely traded integrated amplifier.",
                "sales_description": null
            }],
            "combined_value": "£400–£500",
            "disclaimer": DISCLAIMER
        })
    }

    #[test]
    fn test_default_config() {
        let config = ValuationConfig::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.temperature, 0.4);
        assert_eq!(config.schema_check, SchemaCheck::Passthrough);
    }

    #[tokio::test]
    async fn test_valid_json_is_passed_through() {
        let reply = json!({ "anything": ["goes", 1] });
        let client = Arc::new(FakeModelClient::with_reply(&reply.to_string()));
        let service = service(client.clone(), SchemaCheck::Passthrough);

        let outcome = service
            .value_json(&json!({ "units": ["Quad 405"] }))
            .await
            .unwrap();
        assert_eq!(outcome, ValuationOutcome::Parsed(reply));
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_reply_is_trimmed_before_decoding() {
        let client = Arc::new(FakeModelClient::with_reply("\n  {\"combined_value\": \"£1\"}  \n"));
        let service = service(client, SchemaCheck::Passthrough);

        let outcome = service
            .value_json(&json!({ "units": ["Quad 405"] }))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ValuationOutcome::Parsed(json!({ "combined_value": "£1" }))
        );
    }

    #[tokio::test]
    async fn test_invalid_json_keeps_trimmed_raw_text() {
        let client = Arc::new(FakeModelClient::with_reply("  Sure! Here it is: {oops  "));
        let service = service(client, SchemaCheck::Passthrough);

        let outcome = service
            .value_json(&json!({ "units": ["Quad 405"] }))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ValuationOutcome::InvalidJson {
                raw: "Sure! Here it is: {oops".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_no_units_makes_no_call() {
        let client = Arc::new(FakeModelClient::with_reply("{}"));
        let service = service(client.clone(), SchemaCheck::Passthrough);

        for body in [json!({}), json!({ "units": [] }), json!({ "units": "Quad 405" })] {
            let err = service.value_json(&body).await.unwrap_err();
            assert!(matches!(err, ValuationError::NoUnits));
        }
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_sends_system_instruction_and_built_prompt() {
        let client = Arc::new(FakeModelClient::with_reply("{}"));
        let service = service(client.clone(), SchemaCheck::Passthrough);
        let request = ValuationRequest::new(vec!["Rega Planar 3".into()])
            .unwrap()
            .with_sales(true);

        service.value_units(&request).await.unwrap();

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system, SYSTEM_INSTRUCTION);
        assert_eq!(
            calls[0].prompt,
            build_prompt(&request.units, "United Kingdom", true)
        );
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let client = Arc::new(FakeModelClient::with_provider_error("timed out"));
        let service = service(client.clone(), SchemaCheck::Passthrough);

        let err = service
            .value_json(&json!({ "units": ["Quad 405"] }))
            .await
            .unwrap_err();
        assert!(matches!(err, ValuationError::Provider(_)));
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_strict_mode_accepts_matching_output() {
        let reply = valid_reply();
        let client = Arc::new(FakeModelClient::with_reply(&reply.to_string()));
        let service = service(client, SchemaCheck::Strict);

        let outcome = service
            .value_json(&json!({ "units": ["Naim NAIT 2"] }))
            .await
            .unwrap();
        assert_eq!(outcome, ValuationOutcome::Parsed(reply));
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_wrong_disclaimer() {
        let mut reply = valid_reply();
        reply["disclaimer"] = json!("Prices are guaranteed.");
        let client = Arc::new(FakeModelClient::with_reply(&reply.to_string()));
        let service = service(client, SchemaCheck::Strict);

        let outcome = service
            .value_json(&json!({ "units": ["Naim NAIT 2"] }))
            .await
            .unwrap();
        assert!(matches!(outcome, ValuationOutcome::SchemaMismatch { .. }));
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_unknown_confidence() {
        let mut reply = valid_reply();
        reply["units"][0]["confidence_level"] = json!("certain");
        let client = Arc::new(FakeModelClient::with_reply(&reply.to_string()));
        let service = service(client, SchemaCheck::Strict);

        let outcome = service
            .value_json(&json!({ "units": ["Naim NAIT 2"] }))
            .await
            .unwrap();
        match outcome {
            ValuationOutcome::SchemaMismatch { raw, .. } => assert_eq!(raw, reply.to_string()),
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }
}
