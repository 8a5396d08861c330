//! Request-side models: prescription entries and the analysis request.

use serde::{Deserialize, Serialize};

/// A single prescription line: one drug with optional dose and frequency.
///
/// The `drug` field may hold a raw surface form (as typed or as extracted
/// from text) or a canonical name after normalization. Dose and frequency
/// stay optional end to end; an entry missing either is still analyzed for
/// interactions and guidance, just not for daily-limit exceedance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrugEntry {
    /// Drug name, raw or canonical
    pub drug: String,
    /// Single dose in milligrams
    #[serde(default)]
    pub dose_mg: Option<u32>,
    /// Administrations per day (0..=12 at the request boundary)
    #[serde(default)]
    pub frequency_per_day: Option<u32>,
}

impl DrugEntry {
    /// Create an entry with just a name.
    pub fn named(drug: impl Into<String>) -> Self {
        Self {
            drug: drug.into(),
            dose_mg: None,
            frequency_per_day: None,
        }
    }

    /// Create a fully specified entry.
    pub fn new(drug: impl Into<String>, dose_mg: u32, frequency_per_day: u32) -> Self {
        Self {
            drug: drug.into(),
            dose_mg: Some(dose_mg),
            frequency_per_day: Some(frequency_per_day),
        }
    }

    /// Total computed daily intake in mg.
    ///
    /// Defined only when both dose and frequency are present and strictly
    /// positive; otherwise the exceedance check is skipped entirely.
    pub fn daily_total_mg(&self) -> Option<u32> {
        match (self.dose_mg, self.frequency_per_day) {
            (Some(dose), Some(freq)) if dose > 0 && freq > 0 => Some(dose.saturating_mul(freq)),
            _ => None,
        }
    }
}

/// An analysis request as received from the service layer.
///
/// A non-empty `drugs` list always takes precedence over `prescription_text`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Patient age in years
    pub age: u32,
    /// Free-text prescription to be run through extraction
    #[serde(default)]
    pub prescription_text: Option<String>,
    /// Explicit, fully-formed drug list built by the caller
    #[serde(default)]
    pub drugs: Option<Vec<DrugEntry>>,
}
