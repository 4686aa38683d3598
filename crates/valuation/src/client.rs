//! Model client seam.
//!
//! `ModelClient` is the single outbound operation the valuation flow needs:
//! one system turn plus one user turn in, one block of text out.

use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use rig::{client::CompletionClient, completion::Prompt, providers::openai};
use std::sync::Mutex;

use crate::error::ValuationError;

// ============================================================================
// Model Client Trait
// ============================================================================

/// Trait for submitting a single completion request.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send `system` as the system turn and `prompt` as the user turn and
    /// return the model's raw text.
    ///
    /// Called at most once per valuation; no retry is attempted.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ValuationError>;
}

// ============================================================================
// OpenAI Implementation
// ============================================================================

/// OpenAI-backed client, constructed once at startup.
pub struct OpenAiModelClient {
    client: openai::Client<HttpClient>,
    model: String,
    temperature: f64,
}

impl OpenAiModelClient {
    /// Create a client for `model` at a fixed sampling `temperature`.
    pub fn new(api_key: &str, model: &str, temperature: f64) -> Result<Self, ValuationError> {
        if api_key.trim().is_empty() {
            return Err(ValuationError::MissingApiKey("openai".to_string()));
        }
        let client: openai::Client<HttpClient> =
            openai::Client::new(api_key).map_err(|e| ValuationError::provider(e.to_string()))?;
        Ok(Self {
            client,
            model: model.to_string(),
            temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }
}

#[async_trait]
impl ModelClient for OpenAiModelClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ValuationError> {
        debug!(
            "Requesting valuation from model {} (temperature {})",
            self.model, self.temperature
        );
        self.client
            .agent(&self.model)
            .preamble(system)
            .temperature(self.temperature)
            .build()
            .prompt(prompt)
            .await
            .map_err(|e| ValuationError::Provider(e.to_string()))
    }
}

// ============================================================================
// Fake Client for Testing
// ============================================================================

/// One recorded call made against [`FakeModelClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub system: String,
    pub prompt: String,
}

/// A fake client for testing that returns a canned reply and records calls.
pub struct FakeModelClient {
    reply: Result<String, String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeModelClient {
    /// Create a fake that always answers with `text`.
    pub fn with_reply(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create a fake that always fails with a provider error.
    pub fn with_provider_error(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }
}

#[async_trait]
impl ModelClient for FakeModelClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ValuationError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                system: system.to_string(),
                prompt: prompt.to_string(),
            });
        }
        self.reply.clone().map_err(ValuationError::Provider)
    }
}
