//! Deterministic fallback prescription parser.
//!
//! Used when no extraction engine is wired in or the engine returns nothing
//! usable. Scans the text for known drug names and aliases (with a little
//! spelling tolerance), then reads a trailing dose and frequency phrase for
//! each hit. Purely lexical; no language understanding.

use std::collections::HashSet;

use strsim::jaro_winkler;

use crate::db::DrugDatabase;
use crate::models::DrugEntry;

/// Minimum jaro-winkler similarity for a misspelled drug token to count.
const FUZZY_THRESHOLD: f64 = 0.92;

/// Shortest token considered for fuzzy drug matching; exact matches
/// pass at any length.
const MIN_TOKEN_LEN: usize = 4;

/// Tokens examined after a drug hit for its dose and frequency.
const WINDOW_LEN: usize = 8;

/// Rule-based parser over a database's known surface forms.
pub struct FallbackParser<'a> {
    db: &'a DrugDatabase,
    /// (lowercase surface form, canonical name)
    surfaces: Vec<(String, &'a str)>,
}

impl<'a> FallbackParser<'a> {
    pub fn new(db: &'a DrugDatabase) -> Self {
        let mut surfaces = Vec::new();
        for name in db.drug_names() {
            if let Some(record) = db.record(name) {
                surfaces.push((record.name.to_lowercase(), record.name.as_str()));
                for alias in &record.aliases {
                    surfaces.push((alias.to_lowercase(), record.name.as_str()));
                }
            }
        }
        Self { db, surfaces }
    }

    /// Parse free text into entries, in order of first appearance.
    /// Repeated mentions of one drug collapse to the first.
    pub fn parse(&self, text: &str) -> Vec<DrugEntry> {
        let tokens: Vec<String> = text
            .split_whitespace()
            .map(|t| {
                t.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .collect();

        let mut hits: Vec<(usize, &str)> = Vec::new();
        for (pos, token) in tokens.iter().enumerate() {
            if let Some(canonical) = self.match_drug(token) {
                hits.push((pos, canonical));
            }
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut entries = Vec::new();
        for (k, &(pos, canonical)) in hits.iter().enumerate() {
            if !seen.insert(canonical) {
                continue;
            }
            let end = hits
                .get(k + 1)
                .map(|&(next, _)| next)
                .unwrap_or(tokens.len())
                .min(pos + 1 + WINDOW_LEN);
            let window = &tokens[pos + 1..end];

            entries.push(DrugEntry {
                drug: canonical.to_string(),
                dose_mg: parse_dose(window),
                frequency_per_day: parse_frequency(window),
            });
        }
        entries
    }

    /// Match one token against known names and aliases, exact first, then
    /// fuzzy for misspellings.
    fn match_drug(&self, token: &str) -> Option<&'a str> {
        if let Some(canonical) = self.db.normalize(token) {
            return Some(canonical);
        }
        if token.len() < MIN_TOKEN_LEN {
            return None;
        }

        let mut best: Option<(f64, &'a str)> = None;
        for (surface, canonical) in &self.surfaces {
            let score = jaro_winkler(token, surface);
            if score >= FUZZY_THRESHOLD && best.map(|(b, _)| score > b).unwrap_or(true) {
                best = Some((score, canonical));
            }
        }
        best.map(|(_, canonical)| canonical)
    }
}

/// First dose in mg found in the window: "500mg" or "500 mg".
fn parse_dose(window: &[String]) -> Option<u32> {
    for (i, word) in window.iter().enumerate() {
        if let Some(num) = word.strip_suffix("mg") {
            if let Ok(value) = num.parse() {
                return Some(value);
            }
        }
        if let Ok(value) = word.parse::<u32>() {
            if window.get(i + 1).map(|u| u == "mg").unwrap_or(false) {
                return Some(value);
            }
        }
    }
    None
}

/// First frequency phrase in the window, as administrations per day.
fn parse_frequency(window: &[String]) -> Option<u32> {
    for (i, word) in window.iter().enumerate() {
        match word.as_str() {
            "once" | "daily" | "nightly" | "od" => return Some(1),
            "twice" | "bid" => return Some(2),
            "thrice" | "tid" => return Some(3),
            "qid" => return Some(4),
            "every" => {
                let n = window.get(i + 1).and_then(|w| w.parse::<u32>().ok());
                let hourly = window
                    .get(i + 2)
                    .map(|w| w.starts_with("hour"))
                    .unwrap_or(false);
                if let Some(n) = n {
                    if hourly && n > 0 && n <= 24 {
                        return Some(24 / n);
                    }
                }
            }
            w => {
                // "q6h" style shorthand
                if let Some(inner) = w.strip_prefix('q').and_then(|w| w.strip_suffix('h')) {
                    if let Ok(n) = inner.parse::<u32>() {
                        if n > 0 && n <= 24 {
                            return Some(24 / n);
                        }
                    }
                }
                // "3 times a day", "three times daily"
                let count = w.parse::<u32>().ok().or(match w {
                    "one" => Some(1),
                    "two" => Some(2),
                    "three" => Some(3),
                    "four" => Some(4),
                    _ => None,
                });
                if let Some(n) = count {
                    if window
                        .get(i + 1)
                        .map(|next| next.starts_with("time"))
                        .unwrap_or(false)
                    {
                        return Some(n);
                    }
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> DrugDatabase {
        DrugDatabase::bundled().unwrap()
    }

    #[test]
    fn test_parses_demo_prescription() {
        let db = db();
        let parser = FallbackParser::new(&db);

        let entries = parser.parse(
            "Paracetamol 500 mg twice daily + Ibuprofen 400 mg every 8 hours for 3 days",
        );

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], DrugEntry::new("Paracetamol", 500, 2));
        assert_eq!(entries[1], DrugEntry::new("Ibuprofen", 400, 3));
    }

    #[test]
    fn test_matches_aliases_and_attached_units() {
        let db = db();
        let parser = FallbackParser::new(&db);

        let entries = parser.parse("acetaminophen 650mg q6h and some advil");

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], DrugEntry::new("Paracetamol", 650, 4));
        assert_eq!(entries[1], DrugEntry::named("Ibuprofen"));
    }

    #[test]
    fn test_exact_short_aliases_match() {
        let db = db();
        let parser = FallbackParser::new(&db);

        let entries = parser.parse("ASA 300mg twice daily");
        assert_eq!(entries, vec![DrugEntry::new("Aspirin", 300, 2)]);

        let entries = parser.parse("mox q8h");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].drug, "Amoxicillin");
        assert_eq!(entries[0].frequency_per_day, Some(3));
    }

    #[test]
    fn test_short_junk_tokens_do_not_fuzzy_match() {
        let db = db();
        let parser = FallbackParser::new(&db);

        // "asa" matches exactly; "as" and "aso" must not match anything
        assert!(parser.parse("take as needed").is_empty());
        assert!(parser.parse("aso 100mg").is_empty());
    }

    #[test]
    fn test_tolerates_misspellings() {
        let db = db();
        let parser = FallbackParser::new(&db);

        let entries = parser.parse("paracetamoll 500mg once daily");

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], DrugEntry::new("Paracetamol", 500, 1));
    }

    #[test]
    fn test_collapses_repeated_mentions() {
        let db = db();
        let parser = FallbackParser::new(&db);

        let entries = parser.parse("Warfarin 5mg daily, then warfarin again at night");

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], DrugEntry::new("Warfarin", 5, 1));
    }

    #[test]
    fn test_unrelated_text_yields_nothing() {
        let db = db();
        let parser = FallbackParser::new(&db);

        assert!(parser.parse("take plenty of rest and fluids").is_empty());
        assert!(parser.parse("").is_empty());
    }

    #[test]
    fn test_frequency_phrases() {
        assert_eq!(parse_frequency(&tokens("twice daily")), Some(2));
        assert_eq!(parse_frequency(&tokens("3 times a day")), Some(3));
        assert_eq!(parse_frequency(&tokens("three times daily")), Some(3));
        assert_eq!(parse_frequency(&tokens("every 6 hours")), Some(4));
        assert_eq!(parse_frequency(&tokens("every 12 hours")), Some(2));
        assert_eq!(parse_frequency(&tokens("q8h")), Some(3));
        assert_eq!(parse_frequency(&tokens("tid with meals")), Some(3));
        assert_eq!(parse_frequency(&tokens("for 3 days")), None);
        assert_eq!(parse_frequency(&tokens("as needed")), None);
    }

    #[test]
    fn test_dose_forms() {
        assert_eq!(parse_dose(&tokens("500 mg twice")), Some(500));
        assert_eq!(parse_dose(&tokens("500mg")), Some(500));
        assert_eq!(parse_dose(&tokens("every 8 hours")), None);
        assert_eq!(parse_dose(&tokens("half a tablet")), None);
    }

    fn tokens(text: &str) -> Vec<String> {
        text.split_whitespace().map(|t| t.to_lowercase()).collect()
    }
}
