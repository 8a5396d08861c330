//! Stateless analysis orchestrator.
//!
//! Pipeline: input (text or explicit list) → extraction → normalization →
//! rule evaluation against the immutable [`DrugDatabase`]. Nothing in here
//! mutates shared state or raises for malformed per-entry data; the only
//! fatal error in the whole core is a dataset that fails to load.

mod fallback;

pub use fallback::*;

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::db::DrugDatabase;
use crate::models::{
    AnalysisRequest, AnalysisResult, DosageGuidance, DoseWarning, DrugEntry,
    ISSUE_MAX_DAILY_EXCEEDED,
};

/// Contract for the model-backed text-extraction collaborator.
///
/// Best-effort by design: implementations return `None` whenever they are
/// unavailable, fail, or produce unusable output, and the caller degrades to
/// the deterministic [`FallbackParser`]. An empty list counts as no result.
pub trait TextExtraction {
    fn extract(&self, text: &str) -> Option<Vec<DrugEntry>>;
}

/// Stateless analyzer over a reference database and an optional extraction
/// engine. Cheap to construct per request.
pub struct Analyzer<'a> {
    db: &'a DrugDatabase,
    engine: Option<&'a dyn TextExtraction>,
}

impl<'a> Analyzer<'a> {
    /// Analyzer with no extraction engine; free text goes straight to the
    /// fallback parser.
    pub fn new(db: &'a DrugDatabase) -> Self {
        Self { db, engine: None }
    }

    /// Analyzer delegating free text to the given engine first.
    pub fn with_engine(db: &'a DrugDatabase, engine: &'a dyn TextExtraction) -> Self {
        Self {
            db,
            engine: Some(engine),
        }
    }

    /// Produce a normalized entry list from the request inputs.
    ///
    /// A non-empty explicit list always wins verbatim over text. Text goes
    /// to the extraction engine, then to the fallback parser when the engine
    /// yields nothing. Names that fail to normalize are retained as given;
    /// downstream lookups for them simply return nothing.
    pub fn extract(
        &self,
        text: Option<&str>,
        explicit_drugs: Option<&[DrugEntry]>,
    ) -> Vec<DrugEntry> {
        let raw: Vec<DrugEntry> = match explicit_drugs {
            Some(list) if !list.is_empty() => list.to_vec(),
            _ => match text {
                Some(text) if !text.trim().is_empty() => {
                    let extracted = self
                        .engine
                        .and_then(|engine| engine.extract(text))
                        .filter(|entries| !entries.is_empty());
                    match extracted {
                        Some(entries) => entries,
                        None => {
                            debug!("extraction engine yielded nothing, using fallback parser");
                            FallbackParser::new(self.db).parse(text)
                        }
                    }
                }
                _ => Vec::new(),
            },
        };

        raw.into_iter()
            .map(|mut entry| {
                if let Some(canonical) = self.db.normalize(&entry.drug) {
                    entry.drug = canonical.to_string();
                }
                entry
            })
            .collect()
    }

    /// Evaluate all rules for the given entries and patient age.
    ///
    /// Pure transformation: interactions over the canonical-name set,
    /// strict-inequality exceedance warnings where dose and frequency are
    /// both known, and per-name guidance plus alternatives (null/empty for
    /// names the database does not know).
    pub fn check(&self, entries: &[DrugEntry], age: u32) -> AnalysisResult {
        let canonical: BTreeSet<&str> = entries
            .iter()
            .filter_map(|entry| self.db.normalize(&entry.drug))
            .collect();
        let interactions = self.db.interactions_among(canonical);

        let mut warnings = Vec::new();
        let mut dosage_guidance = BTreeMap::new();
        let mut alternatives = BTreeMap::new();

        for entry in entries {
            let name = self.db.normalize(&entry.drug).unwrap_or(&entry.drug);
            let max_daily = self.db.max_daily_mg(name, age);

            if let (Some(total), Some(max)) = (entry.daily_total_mg(), max_daily) {
                if total > max {
                    warnings.push(DoseWarning {
                        drug: name.to_string(),
                        issue: ISSUE_MAX_DAILY_EXCEEDED.to_string(),
                        computed_mg_per_day: total,
                        max_daily_mg: max,
                    });
                }
            }

            dosage_guidance
                .entry(name.to_string())
                .or_insert_with(|| DosageGuidance {
                    recommended_dose_for_age: self
                        .db
                        .recommended_dose(name, age)
                        .map(str::to_string),
                    max_daily_mg: max_daily,
                });
            alternatives
                .entry(name.to_string())
                .or_insert_with(|| self.db.alternatives_for(name).to_vec());
        }

        AnalysisResult {
            drugs_parsed: entries.to_vec(),
            interactions,
            dosage_guidance,
            warnings,
            alternatives,
        }
    }

    /// Full pipeline over a request: extract, then check.
    pub fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult {
        let entries = self.extract(
            request.prescription_text.as_deref(),
            request.drugs.as_deref(),
        );
        self.check(&entries, request.age)
    }
}
