//! Response-side models: interactions, guidance, warnings, the full result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::DrugEntry;

/// Clinical severity of a drug-drug interaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Moderate,
    Major,
}

/// A known interaction between an unordered pair of drugs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Interaction {
    /// The two canonical drug names involved
    pub pair: [String; 2],
    pub severity: Severity,
    /// Short explanatory note for display
    pub note: String,
}

/// Age-bracketed daily intake ceilings in mg.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoseLimits {
    pub adult: u32,
    pub child: u32,
}

/// Per-drug dosage guidance attached to a result.
///
/// Both fields are null for drugs the database does not know.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DosageGuidance {
    pub recommended_dose_for_age: Option<String>,
    pub max_daily_mg: Option<u32>,
}

/// A dose-exceedance warning for a single entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoseWarning {
    pub drug: String,
    pub issue: String,
    pub computed_mg_per_day: u32,
    pub max_daily_mg: u32,
}

/// Issue label used on every exceedance warning.
pub const ISSUE_MAX_DAILY_EXCEEDED: &str = "Dose exceeds max daily limit";

/// The complete outcome of one analysis.
///
/// Guidance and alternatives maps are keyed by every distinct entry name:
/// canonical where the name resolved, the raw surface form otherwise (which
/// then carries null guidance and an empty alternatives list).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisResult {
    /// Entries after extraction/normalization, in input order
    pub drugs_parsed: Vec<DrugEntry>,
    /// Deduplicated interaction records, sorted by pair
    pub interactions: Vec<Interaction>,
    pub dosage_guidance: BTreeMap<String, DosageGuidance>,
    pub warnings: Vec<DoseWarning>,
    pub alternatives: BTreeMap<String, Vec<String>>,
}
