//! Rx-Check Core Library
//!
//! Prescription analysis engine: canonical drug-name resolution, pairwise
//! interaction lookup, age-bracketed dosage guidance, dose-limit warnings,
//! and substitute suggestions.
//!
//! # Architecture
//!
//! ```text
//! free text ──► TextExtraction engine ──┐        (model-backed, best-effort)
//!                      │ no result      │
//!                      ▼                │
//!               FallbackParser ─────────┤        (deterministic)
//!                                       ▼
//! explicit list ──────────────► Analyzer::extract
//!                                       │  normalize names
//!                                       ▼
//!                               Analyzer::check ──► AnalysisResult
//!                                       │
//!                                       ▼
//!                            DrugDatabase (immutable,
//!                            indices built at load)
//! ```
//!
//! # Core Principle
//!
//! **The dataset is the only thing that can fail.** A structurally invalid
//! reference document prevents startup; after a successful load every
//! analysis completes with a (possibly partial) result. Unknown drugs,
//! missing dose fields, and extraction failures all degrade, never raise.
//!
//! # Modules
//!
//! - [`db`]: reference dataset loading, validation, indices, hot reload
//! - [`models`]: request/response types (DrugEntry, AnalysisResult, etc.)
//! - [`analyzer`]: extraction orchestration and rule evaluation

pub mod analyzer;
pub mod db;
pub mod models;

// Re-export commonly used types
pub use analyzer::{Analyzer, FallbackParser, TextExtraction};
pub use db::{AgeBrackets, AgeGroup, DataError, DrugDatabase, DrugRecord, SharedDatabase};
pub use models::{
    AnalysisRequest, AnalysisResult, DosageGuidance, DoseLimits, DoseWarning, DrugEntry,
    Interaction, Severity,
};
