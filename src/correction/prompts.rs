//! Prompts sent to the correction model.

/// System instruction for reconciling OCR'd tabulation rows with the MUTCD.
pub const SYSTEM_PROMPT: &str = r#"You are a MUTCD sign expert. Analyze and correct this OCR-extracted JSON for accuracy: Fix codes (e.g., "Ma-8" to "M4-8"), remove artifacts (e.g., "|", commas), add full descriptions from MUTCD standards, infer quantities if possible. Return ONLY the corrected JSON array, no extra text. Every element must keep the keys "code", "size", "description" and "quantity".
- Match the MUTCD code to the description, because the description is easier for the OCR to read. When the code and the description disagree, the description is right and the code is wrong, never the other way around. Always check each MUTCD code you output against its description."#;
