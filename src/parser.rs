//! Tabulation line parser
//!
//! Turns raw OCR text into [`SignRecord`]s using positional heuristics: the
//! first token is the sign code, the next tokens are the size, the rest is the
//! description with an optional trailing quantity.
//!
//! The size is normally the three tokens after the code (`30 x 30`). When the
//! token after the code is already a complete dimension (`24x30x.080`), that
//! token alone is the size and the description starts right after it. Rows
//! like `M4-8 24x30x.080 REGULATORY SIGN 5` depend on this; keep it when
//! changing the positional rules.

use crate::record::SignRecord;
use once_cell::sync::Lazy;
use regex::Regex;

/// Lines containing any of these (case-insensitively) are sheet headers
pub const HEADER_KEYWORDS: &[&str] = &[
    "STD. NO.",
    "SIZE",
    "DESCRIPTION",
    "QUANTITY",
    "TABULATION",
    "INCLUDED",
    "CHANNEL",
    "TYPE",
];

/// Minimum tokens for a line to count as a tabulation row
pub const MIN_TOKENS: usize = 4;

/// Tokens taken for a size written with spaces, e.g. `30 x 30`
const SPACED_SIZE_TOKENS: usize = 3;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// A size already written as one token, e.g. `24x30` or `24x30x.080`
static COMPACT_SIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\d+(?:\.\d+)?|\.\d+)(?:[xX](?:\d+(?:\.\d+)?|\.\d+))+$").expect("valid regex")
});

/// Parse every tabulation row in `text`, in source order
pub fn parse_tabulation(text: &str) -> Vec<SignRecord> {
    text.lines().filter_map(parse_line).collect()
}

/// Parse a single OCR line; `None` for blank, header or short lines
pub fn parse_line(line: &str) -> Option<SignRecord> {
    let line = line.trim();
    if line.is_empty() || is_header(line) {
        return None;
    }

    let words: Vec<&str> = WHITESPACE.split(line).collect();
    if words.len() < MIN_TOKENS {
        return None;
    }

    let size_end = if COMPACT_SIZE.is_match(words[1]) {
        2
    } else {
        1 + SPACED_SIZE_TOKENS
    };

    let code = words[0].trim().to_string();
    let size = words[1..size_end].join(" ").trim().to_string();

    let mut desc_words = &words[size_end..];
    let mut quantity = String::new();
    if let Some((last, rest)) = desc_words.split_last() {
        if is_quantity(last) {
            quantity = last.trim().to_string();
            desc_words = rest;
        }
    }
    let description = desc_words.join(" ").trim().to_string();

    Some(SignRecord {
        code,
        size,
        description,
        quantity,
    })
}

fn is_header(line: &str) -> bool {
    let upper = line.to_uppercase();
    HEADER_KEYWORDS.iter().any(|keyword| upper.contains(keyword))
}

fn is_quantity(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}
