//! Reference drug database.
//!
//! Loaded once from a JSON document, validated structurally, then read by
//! any number of concurrent analyses. All lookup indices (name/alias →
//! record, unordered pair → interaction) are built here at load time so
//! every per-query lookup is a hash probe, never a table scan.

mod brackets;
mod document;
mod shared;

pub use brackets::*;
pub use document::*;
pub use shared::*;

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::models::{DoseLimits, Interaction};

/// Fatal dataset errors. Any of these prevents database construction;
/// nothing downstream of a successful load can raise.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed dataset document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate canonical drug name: {0}")]
    DuplicateDrug(String),

    #[error("alias {alias:?} of {drug:?} collides with {existing:?}")]
    AliasCollision {
        alias: String,
        drug: String,
        existing: String,
    },

    #[error("{section} references unknown drug: {name}")]
    UnknownDrug { section: &'static str, name: String },

    #[error("interaction pairs {0} with itself")]
    SelfInteraction(String),

    #[error("duplicate interaction pair: {0} + {1}")]
    DuplicatePair(String, String),
}

pub type DataResult<T> = Result<T, DataError>;

/// Demo dataset shipped with the crate.
const BUNDLED_DATA: &str = include_str!("../../datasets/drug_data.json");

/// Immutable reference pharmacology data with precomputed indices.
#[derive(Debug)]
pub struct DrugDatabase {
    records: Vec<DrugRecord>,
    /// lowercase name or alias -> record index; first declaration wins is
    /// moot because collisions are rejected at load
    name_index: HashMap<String, usize>,
    /// record index -> age-bracketed daily limits
    limits: HashMap<usize, DoseLimits>,
    interactions: Vec<Interaction>,
    /// lowercase (a, b) with a <= b -> index into `interactions`
    pair_index: HashMap<(String, String), usize>,
    /// record index -> ordered substitute names (canonical)
    alternatives: HashMap<usize, Vec<String>>,
    brackets: AgeBrackets,
}

impl DrugDatabase {
    /// Load and validate a dataset from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> DataResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse and validate a dataset from a JSON string.
    pub fn from_json(raw: &str) -> DataResult<Self> {
        let doc: DatasetDoc = serde_json::from_str(raw)?;
        Self::from_doc(doc)
    }

    /// Build the database that ships with the crate.
    pub fn bundled() -> DataResult<Self> {
        Self::from_json(BUNDLED_DATA)
    }

    /// Validate a parsed document and build all indices.
    pub fn from_doc(doc: DatasetDoc) -> DataResult<Self> {
        let mut name_index: HashMap<String, usize> = HashMap::new();

        // Canonical names first so an alias colliding with a later record's
        // name is still caught.
        for (idx, record) in doc.drugs.iter().enumerate() {
            let key = record.name.trim().to_lowercase();
            if name_index.contains_key(&key) {
                return Err(DataError::DuplicateDrug(record.name.clone()));
            }
            name_index.insert(key, idx);
        }
        for (idx, record) in doc.drugs.iter().enumerate() {
            for alias in &record.aliases {
                let key = alias.trim().to_lowercase();
                if let Some(&existing) = name_index.get(&key) {
                    return Err(DataError::AliasCollision {
                        alias: alias.clone(),
                        drug: record.name.clone(),
                        existing: doc.drugs[existing].name.clone(),
                    });
                }
                name_index.insert(key, idx);
            }
        }

        let resolve = |section: &'static str, name: &str| -> DataResult<usize> {
            name_index
                .get(&name.trim().to_lowercase())
                .copied()
                .ok_or_else(|| DataError::UnknownDrug {
                    section,
                    name: name.to_string(),
                })
        };

        let mut limits = HashMap::new();
        for (name, entry) in &doc.max_daily_dose_mg {
            let idx = resolve("max_daily_dose_mg", name)?;
            limits.insert(idx, *entry);
        }

        let mut interactions = Vec::with_capacity(doc.interactions.len());
        let mut pair_index = HashMap::new();
        for record in &doc.interactions {
            let a = doc.drugs[resolve("interactions", &record.pair[0])?].name.clone();
            let b = doc.drugs[resolve("interactions", &record.pair[1])?].name.clone();
            if a == b {
                return Err(DataError::SelfInteraction(a));
            }
            // Store the pair in canonical sorted order so query output is
            // deterministic regardless of declaration order.
            let pair = if a <= b { [a, b] } else { [b, a] };
            let key = (pair[0].to_lowercase(), pair[1].to_lowercase());
            if pair_index.contains_key(&key) {
                return Err(DataError::DuplicatePair(pair[0].clone(), pair[1].clone()));
            }
            pair_index.insert(key, interactions.len());
            interactions.push(Interaction {
                pair,
                severity: record.severity,
                note: record.note.clone(),
            });
        }

        let mut alternatives: HashMap<usize, Vec<String>> = HashMap::new();
        for (name, subs) in &doc.alternatives {
            let idx = resolve("alternatives", name)?;
            let mut canonical_subs = Vec::with_capacity(subs.len());
            for sub in subs {
                let sub_idx = resolve("alternatives", sub)?;
                canonical_subs.push(doc.drugs[sub_idx].name.clone());
            }
            alternatives.insert(idx, canonical_subs);
        }

        let db = Self {
            records: doc.drugs,
            name_index,
            limits,
            interactions,
            pair_index,
            alternatives,
            brackets: doc.age_brackets.unwrap_or_default(),
        };

        info!(
            drugs = db.records.len(),
            interactions = db.interactions.len(),
            "drug database loaded"
        );

        Ok(db)
    }

    fn resolve_idx(&self, raw: &str) -> Option<usize> {
        self.name_index.get(&raw.trim().to_lowercase()).copied()
    }

    /// Resolve a raw name or alias to its canonical name, case-insensitively.
    ///
    /// Idempotent: normalizing an already-canonical name returns it unchanged.
    pub fn normalize(&self, raw: &str) -> Option<&str> {
        self.resolve_idx(raw).map(|idx| self.records[idx].name.as_str())
    }

    /// Full record for a raw or canonical name.
    pub fn record(&self, name: &str) -> Option<&DrugRecord> {
        self.resolve_idx(name).map(|idx| &self.records[idx])
    }

    /// All canonical drug names, in declaration order.
    pub fn drug_names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }

    /// Bracket configuration in effect.
    pub fn brackets(&self) -> AgeBrackets {
        self.brackets
    }

    /// Classify an age under the configured brackets.
    pub fn age_group(&self, age: u32) -> AgeGroup {
        self.brackets.classify(age)
    }

    /// Dosing string appropriate for the patient's age bracket.
    pub fn recommended_dose(&self, name: &str, age: u32) -> Option<&str> {
        let record = self.record(name)?;
        if self.age_group(age).is_pediatric() {
            Some(record.child_dose.as_str())
        } else {
            Some(record.adult_dose.as_str())
        }
    }

    /// Configured daily ceiling in mg for the patient's age bracket.
    pub fn max_daily_mg(&self, name: &str, age: u32) -> Option<u32> {
        let idx = self.resolve_idx(name)?;
        let limits = self.limits.get(&idx)?;
        if self.age_group(age).is_pediatric() {
            Some(limits.child)
        } else {
            Some(limits.adult)
        }
    }

    /// Every known interaction among the given drug names.
    ///
    /// Names are normalized and deduplicated first; unresolvable names and
    /// self-pairs contribute nothing. Each matching record appears exactly
    /// once, and the output is sorted by pair, so the result is identical
    /// under any permutation or duplication of the input.
    pub fn interactions_among<I>(&self, names: I) -> Vec<Interaction>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let canonical: BTreeSet<&str> = names
            .into_iter()
            .filter_map(|n| self.normalize(n.as_ref()))
            .collect();
        let canonical: Vec<&str> = canonical.into_iter().collect();

        let mut found = Vec::new();
        for (i, a) in canonical.iter().enumerate() {
            for b in &canonical[i + 1..] {
                let key = (a.to_lowercase(), b.to_lowercase());
                if let Some(&pos) = self.pair_index.get(&key) {
                    found.push(self.interactions[pos].clone());
                }
            }
        }
        found
    }

    /// Configured substitute drugs, in declaration order. Empty when none
    /// are configured or the name is unknown, never an error.
    pub fn alternatives_for(&self, name: &str) -> &[String] {
        self.resolve_idx(name)
            .and_then(|idx| self.alternatives.get(&idx))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}
