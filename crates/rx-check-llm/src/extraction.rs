//! Parsing of model output into prescription entries.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use rx_check_core::models::DrugEntry;
use rx_check_core::TextExtraction;

use crate::prompts::build_full_prompt;

/// Extraction errors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("LLM inference error: {0}")]
    Inference(String),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Raw structured output from the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    pub drugs: Vec<RawExtractedDrug>,
}

/// One extracted medicine as the model reports it.
///
/// Numbers come in as floats because models routinely emit `500.0`; they are
/// sanitized to the integer wire shape in [`to_drug_entries`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawExtractedDrug {
    pub drug: String,
    #[serde(default)]
    pub dose_mg: Option<f64>,
    #[serde(default)]
    pub frequency_per_day: Option<f64>,
}

/// Parse model output into structured form.
///
/// Lenient by necessity: locates the JSON object inside any surrounding
/// chatter, and also accepts a bare array of medicines.
pub fn parse_extraction_output(raw: &str) -> ExtractionResult<ExtractionOutput> {
    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
        if start < end {
            if let Ok(output) = serde_json::from_str::<ExtractionOutput>(&raw[start..=end]) {
                return Ok(output);
            }
        }
    }

    if let (Some(start), Some(end)) = (raw.find('['), raw.rfind(']')) {
        if start < end {
            let drugs: Vec<RawExtractedDrug> = serde_json::from_str(&raw[start..=end])?;
            return Ok(ExtractionOutput { drugs });
        }
    }

    Err(ExtractionError::InvalidFormat(
        "no JSON object or array found in response".into(),
    ))
}

/// Convert raw model output to core entries.
///
/// Drops nameless rows, rounds fractional numbers, and clamps frequency to
/// the request boundary of 0..=12 per day.
pub fn to_drug_entries(output: &ExtractionOutput) -> Vec<DrugEntry> {
    output
        .drugs
        .iter()
        .filter(|d| !d.drug.trim().is_empty())
        .map(|d| DrugEntry {
            drug: d.drug.trim().to_string(),
            dose_mg: d.dose_mg.and_then(sanitize_dose),
            frequency_per_day: d.frequency_per_day.and_then(sanitize_frequency),
        })
        .collect()
}

fn sanitize_dose(value: f64) -> Option<u32> {
    if value.is_finite() && (0.0..=100_000.0).contains(&value) {
        Some(value.round() as u32)
    } else {
        None
    }
}

fn sanitize_frequency(value: f64) -> Option<u32> {
    if value.is_finite() && value >= 0.0 {
        Some((value.round() as u32).min(12))
    } else {
        None
    }
}

/// Something that can complete a prompt: a local llama.cpp model, a remote
/// inference API, or a test double.
pub trait ModelClient {
    fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Model-backed implementation of the core's extraction contract.
///
/// Any failure (inference, parse, empty output) reports "no result" so the
/// analyzer falls back to deterministic parsing instead of erroring.
pub struct ModelExtractor<C: ModelClient> {
    client: C,
    include_examples: bool,
}

impl<C: ModelClient> ModelExtractor<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            include_examples: true,
        }
    }

    /// Skip few-shot examples, for models with tight context windows.
    pub fn without_examples(client: C) -> Self {
        Self {
            client,
            include_examples: false,
        }
    }
}

impl<C: ModelClient> TextExtraction for ModelExtractor<C> {
    fn extract(&self, text: &str) -> Option<Vec<DrugEntry>> {
        let prompt = build_full_prompt(text, self.include_examples);
        let response = match self.client.complete(&prompt) {
            Ok(response) => response,
            Err(err) => {
                warn!(%err, "model completion failed");
                return None;
            }
        };

        match parse_extraction_output(&response) {
            Ok(output) => {
                let entries = to_drug_entries(&output);
                if entries.is_empty() {
                    None
                } else {
                    Some(entries)
                }
            }
            Err(err) => {
                warn!(%err, "model output was not parseable");
                None
            }
        }
    }
}

/// Canned client for testing without actual inference.
pub struct MockClient {
    response: anyhow::Result<String>,
}

impl MockClient {
    pub fn returning(response: impl Into<String>) -> Self {
        Self {
            response: Ok(response.into()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(anyhow::anyhow!(message.into())),
        }
    }
}

impl ModelClient for MockClient {
    fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
        match &self.response {
            Ok(response) => Ok(response.clone()),
            Err(err) => Err(anyhow::anyhow!("{err}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn parse_never_panics_on_arbitrary_output(raw in ".{0,200}") {
            let _ = parse_extraction_output(&raw);
        }

        #[test]
        fn sanitized_values_stay_on_the_wire_boundary(value in proptest::num::f64::ANY) {
            if let Some(freq) = sanitize_frequency(value) {
                prop_assert!(freq <= 12);
            }
            if let Some(dose) = sanitize_dose(value) {
                prop_assert!(dose <= 100_000);
            }
        }

        #[test]
        fn well_formed_outputs_round_trip(
            dose in proptest::option::of(0u32..10_000),
            freq in proptest::option::of(0u32..=12),
        ) {
            let raw = serde_json::json!({
                "drugs": [{"drug": "Paracetamol", "dose_mg": dose, "frequency_per_day": freq}]
            })
            .to_string();

            let output = parse_extraction_output(&raw).unwrap();
            let entries = to_drug_entries(&output);
            prop_assert_eq!(entries.len(), 1);
            prop_assert_eq!(entries[0].dose_mg, dose);
            prop_assert_eq!(entries[0].frequency_per_day, freq);
        }
    }

    #[test]
    fn test_parse_extraction_output() {
        let json = r#"{"drugs":[{"drug":"Paracetamol","dose_mg":500,"frequency_per_day":2}]}"#;

        let output = parse_extraction_output(json).unwrap();
        assert_eq!(output.drugs.len(), 1);
        assert_eq!(output.drugs[0].drug, "Paracetamol");
        assert_eq!(output.drugs[0].dose_mg, Some(500.0));
    }

    #[test]
    fn test_parse_output_with_surrounding_chatter() {
        let raw = r#"Here are the extracted medicines:
{"drugs":[{"drug":"Warfarin","dose_mg":5,"frequency_per_day":1}]}
Let me know if you need anything else."#;

        let output = parse_extraction_output(raw).unwrap();
        assert_eq!(output.drugs[0].drug, "Warfarin");
    }

    #[test]
    fn test_parse_bare_array() {
        let raw = r#"[{"drug":"Ibuprofen","dose_mg":400.0,"frequency_per_day":3}]"#;

        let output = parse_extraction_output(raw).unwrap();
        assert_eq!(output.drugs[0].drug, "Ibuprofen");
        assert_eq!(output.drugs[0].dose_mg, Some(400.0));
    }

    #[test]
    fn test_parse_garbage_is_an_error() {
        assert!(parse_extraction_output("I could not find any medicines.").is_err());
        assert!(parse_extraction_output("{not json}").is_err());
    }

    #[test]
    fn test_to_drug_entries_sanitizes() {
        let output = ExtractionOutput {
            drugs: vec![
                RawExtractedDrug {
                    drug: " Paracetamol ".into(),
                    dose_mg: Some(500.4),
                    frequency_per_day: Some(2.0),
                },
                RawExtractedDrug {
                    drug: "Ibuprofen".into(),
                    dose_mg: Some(-10.0),
                    frequency_per_day: Some(99.0),
                },
                RawExtractedDrug {
                    drug: "   ".into(),
                    dose_mg: Some(100.0),
                    frequency_per_day: Some(1.0),
                },
            ],
        };

        let entries = to_drug_entries(&output);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], DrugEntry::new("Paracetamol", 500, 2));
        assert_eq!(entries[1].dose_mg, None);
        assert_eq!(entries[1].frequency_per_day, Some(12));
    }

    #[test]
    fn test_extractor_returns_entries_on_good_output() {
        let client = MockClient::returning(
            r#"{"drugs":[{"drug":"acetaminophen","dose_mg":650,"frequency_per_day":4}]}"#,
        );
        let extractor = ModelExtractor::new(client);

        let entries = extractor.extract("acetaminophen 650mg q6h").unwrap();
        assert_eq!(entries, vec![DrugEntry::new("acetaminophen", 650, 4)]);
    }

    #[test]
    fn test_extractor_degrades_to_none() {
        let extractor = ModelExtractor::new(MockClient::failing("model unavailable"));
        assert!(extractor.extract("Paracetamol 500mg").is_none());

        let extractor = ModelExtractor::new(MockClient::returning("no medicines found"));
        assert!(extractor.extract("Paracetamol 500mg").is_none());

        let extractor = ModelExtractor::new(MockClient::returning(r#"{"drugs":[]}"#));
        assert!(extractor.extract("Paracetamol 500mg").is_none());
    }

    #[test]
    fn test_extractor_feeds_analyzer_fallback_chain() {
        use rx_check_core::{Analyzer, DrugDatabase};

        let db = DrugDatabase::bundled().unwrap();
        let extractor = ModelExtractor::new(MockClient::failing("model unavailable"));
        let analyzer = Analyzer::with_engine(&db, &extractor);

        // Engine fails, fallback parser still produces a result
        let result = analyzer.check(
            &analyzer.extract(Some("Paracetamol 500 mg twice daily"), None),
            30,
        );
        assert_eq!(result.drugs_parsed, vec![DrugEntry::new("Paracetamol", 500, 2)]);
    }
}
