//! Prompts for prescription drug extraction.
//!
//! Designed for small instruction-tuned models with JSON grammar constraints.

/// System prompt for prescription extraction.
pub const SYSTEM_PROMPT: &str = r#"You are a medical assistant that extracts structured drug information from prescription text.

Extract each prescribed medicine with the following information:
- drug: The medicine name as written (brand name, generic name, or common abbreviation)
- dose_mg: Single dose in milligrams (number only, null if not stated in mg)
- frequency_per_day: How many times per day it is taken (null if not stated)

Convert frequency phrases to a number per day:
- "twice daily" = 2
- "every 8 hours" = 3
- "q6h" = 4
- "once at night" = 1

Output JSON with a "drugs" array containing the extracted medicines. Do not invent medicines that are not in the text."#;

/// User prompt template for one prescription.
pub fn make_extraction_prompt(text: &str) -> String {
    format!(
        r#"Extract all medicines from this prescription text:

"{}"

Return a JSON object with a "drugs" array. Each element should have:
- drug: The medicine name
- dose_mg: Dose in milligrams (number only, null if not specified)
- frequency_per_day: Administrations per day (number only, null if not specified)"#,
        text
    )
}

/// JSON grammar constraint to force valid output format.
pub const JSON_GRAMMAR: &str = r#"
root ::= object
object ::= "{" ws "\"drugs\"" ws ":" ws drugs ws "}"
drugs ::= "[" ws (drug (ws "," ws drug)*)? ws "]"
drug ::= "{" ws
    "\"drug\"" ws ":" ws string ws "," ws
    "\"dose_mg\"" ws ":" ws (number | "null") ws "," ws
    "\"frequency_per_day\"" ws ":" ws (number | "null") ws
"}"
string ::= "\"" ([^"\\] | "\\" .)* "\""
number ::= "-"? [0-9]+ ("." [0-9]+)?
ws ::= [ \t\n]*
"#;

/// Few-shot examples for better extraction accuracy.
pub const FEW_SHOT_EXAMPLES: &[(&str, &str)] = &[
    (
        "Paracetamol 500 mg twice daily + Ibuprofen 400 mg every 8 hours for 3 days",
        r#"{"drugs":[{"drug":"Paracetamol","dose_mg":500,"frequency_per_day":2},{"drug":"Ibuprofen","dose_mg":400,"frequency_per_day":3}]}"#,
    ),
    (
        "Tab Warfarin 5mg once daily at bedtime",
        r#"{"drugs":[{"drug":"Warfarin","dose_mg":5,"frequency_per_day":1}]}"#,
    ),
    (
        "Amoxicillin syrup q8h and cetirizine as needed",
        r#"{"drugs":[{"drug":"Amoxicillin","dose_mg":null,"frequency_per_day":3},{"drug":"cetirizine","dose_mg":null,"frequency_per_day":null}]}"#,
    ),
];

/// Build a complete prompt with system context and few-shot examples.
pub fn build_full_prompt(text: &str, include_examples: bool) -> String {
    let mut prompt = String::new();

    // System context
    prompt.push_str("<|system|>\n");
    prompt.push_str(SYSTEM_PROMPT);
    prompt.push_str("\n<|end|>\n");

    // Few-shot examples
    if include_examples {
        for (input, output) in FEW_SHOT_EXAMPLES {
            prompt.push_str("<|user|>\n");
            prompt.push_str(&make_extraction_prompt(input));
            prompt.push_str("\n<|end|>\n");
            prompt.push_str("<|assistant|>\n");
            prompt.push_str(output);
            prompt.push_str("\n<|end|>\n");
        }
    }

    // Actual request
    prompt.push_str("<|user|>\n");
    prompt.push_str(&make_extraction_prompt(text));
    prompt.push_str("\n<|end|>\n");
    prompt.push_str("<|assistant|>\n");

    prompt
}
