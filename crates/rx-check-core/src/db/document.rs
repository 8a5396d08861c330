//! Wire format of the reference dataset document.
//!
//! The document is plain JSON with four data sections plus optional age
//! bracket configuration:
//!
//! ```json
//! {
//!   "drugs": [{"name": "...", "adult_dose": "...", "child_dose": "...", "aliases": []}],
//!   "max_daily_dose_mg": {"Name": {"adult": 4000, "child": 2000}},
//!   "interactions": [{"pair": ["A", "B"], "severity": "moderate", "note": "..."}],
//!   "alternatives": {"Name": ["Other", "..."]},
//!   "age_brackets": {"child_max": 12, "adolescent_max": 17}
//! }
//! ```
//!
//! Structural and referential validation happens when the document is turned
//! into a [`DrugDatabase`](super::DrugDatabase), not here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{DoseLimits, Interaction};

use super::AgeBrackets;

/// A single reference drug record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrugRecord {
    /// Canonical name, unique case-insensitively across the whole document
    pub name: String,
    /// Human-readable adult dosing string (e.g., "500mg q6h")
    pub adult_dose: String,
    /// Human-readable pediatric dosing string
    pub child_dose: String,
    /// Alternate surface forms, case-insensitive, collision-free
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// The parsed reference document, prior to index construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatasetDoc {
    pub drugs: Vec<DrugRecord>,
    #[serde(default)]
    pub max_daily_dose_mg: BTreeMap<String, DoseLimits>,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
    #[serde(default)]
    pub alternatives: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub age_brackets: Option<AgeBrackets>,
}
