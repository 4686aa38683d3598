//! Valuation prompt builder.
//!
//! Renders the fixed dealer instruction set sent as the user turn, plus the
//! short system instruction that sets the persona.

/// Country used when the caller does not name one.
pub const DEFAULT_COUNTRY: &str = "United Kingdom";

/// System turn sent ahead of the built prompt.
pub const SYSTEM_INSTRUCTION: &str = "You are a calm, experienced second-hand hi-fi dealer. \
You are factual and understated.";

/// Disclaimer the model must reproduce verbatim.
pub const DISCLAIMER: &str = "These figures are indicative only and reflect typical second-hand UK market behaviour. Final sale prices vary depending on condition, demand, and presentation.";

/// Build the valuation prompt for a list of units.
///
/// Pure and deterministic. Unit text is echoed as-is, without escaping.
pub fn build_prompt(units: &[String], country: &str, include_sales: bool) -> String {
    let include_sales = render_flag(include_sales);
    let units = render_units(units);

    let prompt = format!(
        r#"
You are an experienced UK-based second-hand hi-fi dealer.

You write calmly, plainly, and factually.
You do not use marketing language.
You do not speculate.
You do not guess confidently.
You do not use Markdown.
You output JSON only.

GEOGRAPHIC SCOPE (CRITICAL)

- Value equipment based on the United Kingdom second-hand market.
- Use typical UK private-sale and specialist-retailer behaviour.
- Do NOT use US or Japanese pricing directly.
- If overseas pricing is required due to rarity in the UK:
  - State this clearly in context
  - Set confidence_level to "broad"

COUNTRY
{country}

INCLUDE SALES DESCRIPTION
{include_sales}

INPUT UNITS
{units}

TASK

For each unit, return:
- unit_name
- estimated_value (UK price range string)
- confidence_level ("high", "medium", or "broad")
- context (short factual paragraph)
- sales_description (string or null)

Then return:
- combined_value (price range string)
- disclaimer (string)

PRICING BEHAVIOUR (NON-NEGOTIABLE)

KNOWN, COMMONLY TRADED UK MODELS:
- Use a tight, realistic range
- Typical spread: ±£50 (±£100 total)
- Changing condition shifts the midpoint ONLY
- Poor condition does NOT widen the range
- confidence_level must be "high" or "medium"

OBSCURE, RARE, OR POORLY DOCUMENTED MODELS:
- Use a wider, conservative range
- confidence_level MUST be "broad"
- State clearly that pricing is inferred from comparable equipment
- Do NOT invent specific sales history
- Do NOT imply strong confidence

MODEL IDENTIFICATION ISSUES

If the model is ambiguous, mis-typed, region-specific, or unclear:
- Still return a value
- Use a cautious range
- Set confidence_level to "broad"
- State identification uncertainty in context
- Do NOT overprice
- Do NOT guess confidently

CONDITION HANDLING

- Higher condition raises the midpoint
- Lower condition lowers the midpoint
- Range width remains consistent for known models

SALES DESCRIPTION RULES

If include_sales is true:
- sales_description MUST be present
- Length: 2–3 short paragraphs
- Tone: calm, factual, honest
- Describe what the item is and its typical reputation or use
- Describe the stated condition plainly
- Do NOT exaggerate
- Do NOT include pricing
- Do NOT use hype or emotional language
- Do NOT use bullet points
- Do NOT mention platforms or marketplaces

OUTPUT RULES

- Output valid JSON only
- No prose outside JSON
- No explanations

JSON SCHEMA (STRICT)

{{
  "units": [
    {{
      "unit_name": "",
      "estimated_value": "",
      "confidence_level": "high | medium | broad",
      "context": "",
      "sales_description": null
    }}
  ],
  "combined_value": "",
  "disclaimer": ""
}}

DISCLAIMER TEXT (USE EXACTLY)

"{DISCLAIMER}"
"#
    );

    prompt.trim().to_string()
}

fn render_flag(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Bracketed, single-quoted list: `['Naim NAIT 2', 'Rega Planar 3']`.
fn render_units(units: &[String]) -> String {
    let items = units
        .iter()
        .map(|unit| format!("'{unit}'"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{items}]")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_build_prompt_is_deterministic() {
        let input = units(&["Naim NAIT 2, good condition", "Rega Planar 3"]);
        let a = build_prompt(&input, DEFAULT_COUNTRY, false);
        let b = build_prompt(&input, DEFAULT_COUNTRY, false);
        assert_eq!(a, b);
    }

    #[test]
    fn test_build_prompt_echoes_inputs() {
        let prompt = build_prompt(&units(&["Quad 405", "Linn LP12"]), "Ireland", true);
        assert!(prompt.contains("COUNTRY\nIreland\n"));
        assert!(prompt.contains("INCLUDE SALES DESCRIPTION\nTrue\n"));
        assert!(prompt.contains("INPUT UNITS\n['Quad 405', 'Linn LP12']\n"));
    }

    #[test]
    fn test_include_sales_renders_false_by_default_flag() {
        let prompt = build_prompt(&units(&["Quad 405"]), DEFAULT_COUNTRY, false);
        assert!(prompt.contains("INCLUDE SALES DESCRIPTION\nFalse\n"));
        assert!(!prompt.contains("INCLUDE SALES DESCRIPTION\nTrue"));
    }

    #[test]
    fn test_build_prompt_contains_exact_disclaimer() {
        let prompt = build_prompt(&units(&["Quad 405"]), DEFAULT_COUNTRY, false);
        assert_eq!(
            DISCLAIMER,
            "These figures are indicative only and reflect typical second-hand UK market \
behaviour. Final sale prices vary depending on condition, demand, and presentation."
        );
        assert!(prompt.ends_with(&format!("\"{DISCLAIMER}\"")));
    }

    #[test]
    fn test_build_prompt_is_trimmed_and_starts_with_persona() {
        let prompt = build_prompt(&units(&["Quad 405"]), DEFAULT_COUNTRY, false);
        assert!(prompt.starts_with("You are an experienced UK-based second-hand hi-fi dealer."));
        assert_eq!(prompt, prompt.trim());
    }

    #[test]
    fn test_build_prompt_renders_schema_braces() {
        let prompt = build_prompt(&units(&["Quad 405"]), DEFAULT_COUNTRY, false);
        assert!(prompt.contains("JSON SCHEMA (STRICT)\n\n{\n  \"units\": [\n    {\n"));
        assert!(prompt.contains("\"confidence_level\": \"high | medium | broad\""));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_build_prompt_contains_pricing_rules() {
        let prompt = build_prompt(&units(&["Quad 405"]), DEFAULT_COUNTRY, false);
        assert!(prompt.contains("Typical spread: ±£50 (±£100 total)"));
        assert!(prompt.contains("confidence_level MUST be \"broad\""));
        assert!(prompt.contains("- Output valid JSON only"));
    }

    #[test]
    fn test_unit_text_is_not_escaped() {
        let prompt = build_prompt(&units(&["Spendor's \"BC1\"\nboxed"]), DEFAULT_COUNTRY, false);
        assert!(prompt.contains("['Spendor's \"BC1\"\nboxed']"));
    }
}
