//! Request, response and outcome types for equipment valuations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValuationError;
use crate::prompt::DEFAULT_COUNTRY;

// ============================================================================
// Request
// ============================================================================

/// A caller's valuation request after shape checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuationRequest {
    /// Equipment descriptions, in submission order. Never empty.
    pub units: Vec<String>,
    /// Target market, echoed into the prompt.
    pub country: String,
    /// Whether the model should write a sales description per unit.
    pub include_sales: bool,
}

impl ValuationRequest {
    /// Create a request with the default country and no sales text.
    pub fn new(units: Vec<String>) -> Result<Self, ValuationError> {
        if units.is_empty() {
            return Err(ValuationError::NoUnits);
        }
        Ok(Self {
            units,
            country: DEFAULT_COUNTRY.to_string(),
            include_sales: false,
        })
    }

    /// Request sales descriptions.
    pub fn with_sales(mut self, include_sales: bool) -> Self {
        self.include_sales = include_sales;
        self
    }

    /// Extract a request from a loosely-typed JSON body.
    ///
    /// `units` must be a non-empty array. String items are used verbatim and
    /// any other item is echoed as its compact JSON text. A missing or null
    /// `country` falls back to [`DEFAULT_COUNTRY`]; `include_sales` is only
    /// true when it is the JSON literal `true`.
    pub fn from_json(body: &Value) -> Result<Self, ValuationError> {
        let units = match body.get("units") {
            Some(Value::Array(items)) if !items.is_empty() => {
                items.iter().map(echo_value).collect::<Vec<_>>()
            }
            _ => return Err(ValuationError::NoUnits),
        };

        let country = match body.get("country") {
            None | Some(Value::Null) => DEFAULT_COUNTRY.to_string(),
            Some(other) => echo_value(other),
        };

        let include_sales = body
            .get("include_sales")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Ok(Self {
            units,
            country,
            include_sales,
        })
    }
}

fn echo_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// Response shape requested from the model
// ============================================================================

/// How sure the model is about a unit's price range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Broad,
}

/// Valuation of a single unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnitValuation {
    pub unit_name: String,
    /// Free-form UK price range, e.g. "£250–£350".
    pub estimated_value: String,
    pub confidence_level: ConfidenceLevel,
    pub context: String,
    #[serde(default)]
    pub sales_description: Option<String>,
}

/// The JSON document the prompt asks the model to return.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValuationResponse {
    pub units: Vec<UnitValuation>,
    pub combined_value: String,
    #[serde(default)]
    pub disclaimer: Option<String>,
}

// ============================================================================
// Outcome
// ============================================================================

/// Terminal result of one valuation round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum ValuationOutcome {
    /// The model returned valid JSON; passed through unchanged.
    Parsed(Value),
    /// The model text was not valid JSON.
    InvalidJson { raw: String },
    /// Strict mode only: valid JSON that does not fit [`ValuationResponse`].
    SchemaMismatch { raw: String, reason: String },
}
