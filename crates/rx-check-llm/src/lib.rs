//! LLM wrapper for structured drug extraction from prescription text.
//!
//! Provides the model-backed half of the core's `TextExtraction` contract:
//! prompt construction, lenient parsing of model output, and an extractor
//! that degrades to "no result" on any failure so the caller can fall back
//! to deterministic parsing.

pub mod extraction;
pub mod prompts;

pub use extraction::*;
pub use prompts::*;
