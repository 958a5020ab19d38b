//! Scalar field validation and cleanup: air dates, quoted titles, numeric
//! extraction, and the noise heuristics that keep stray cell content out of
//! typed fields. Invalid values degrade to None, never to errors.

use std::sync::LazyLock;

use regex::Regex;

pub const MONTH_NAMES: &str = "January|February|March|April|May|June|July|August|September|October|November|December";

static AIR_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(?:{})\s+\d{{1,2}},\s+\d{{4}}$", MONTH_NAMES)).unwrap()
});
static CITATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]").unwrap());
static DATE_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^air\s*date:?\s*").unwrap());
static FOOTNOTE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\^\s*\d").unwrap());
static NOTES_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^notes?:").unwrap());
static LONE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-z]+(?:\s*/\s*[A-Z][a-z]+)?$").unwrap());
static INT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static FLOAT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").unwrap());

/// Tokens the wiki uses for not-yet-known dates. Checked before the grammar.
const PLACEHOLDERS: &[&str] = &["—", "–", "-", "tbd", "tba", "tbc", "n/a", "unknown"];

/// Validate a candidate air date against the `MonthName D[D], YYYY` grammar.
/// A leading "Air date:" label and bracketed citation markers are stripped
/// first. Placeholders and noise are rejected; rejection yields None.
pub fn validate_air_date(raw: &str) -> Option<String> {
    let stripped = CITATION_RE.replace_all(raw, "");
    let stripped = DATE_LABEL_RE.replace(stripped.trim(), "");
    let candidate = stripped.trim();
    if candidate.is_empty() {
        return None;
    }
    if PLACEHOLDERS.contains(&candidate.to_lowercase().as_str()) {
        return None;
    }
    if is_noise(candidate) {
        return None;
    }
    if AIR_DATE_RE.is_match(candidate) {
        Some(candidate.to_string())
    } else {
        None
    }
}

/// Heuristics for cell content that is not a value at all: footnote markers,
/// "Notes:" prefixes, and stray contestant names (a single capitalized word
/// or a slash-joined pair) mis-aligned into a data column.
pub fn is_noise(s: &str) -> bool {
    let t = s.trim();
    FOOTNOTE_RE.is_match(t) || NOTES_PREFIX_RE.is_match(t) || LONE_NAME_RE.is_match(t)
}

/// Strip surrounding straight/curly quotes and whitespace.
pub fn clean_quoted(s: &str) -> String {
    s.trim()
        .trim_matches(|c| matches!(c, '“' | '”' | '"' | '\'' | ' '))
        .trim()
        .to_string()
}

/// First integer in the string, commas stripped.
pub fn first_int(s: &str) -> Option<u32> {
    let cleaned = s.replace(',', "");
    INT_RE.find(&cleaned).and_then(|m| m.as_str().parse().ok())
}

/// First decimal number in the string, commas stripped.
pub fn first_float(s: &str) -> Option<f64> {
    let cleaned = s.replace(',', "");
    FLOAT_RE.find(&cleaned).and_then(|m| m.as_str().parse().ok())
}

/// Parse a colspan/rowspan attribute value. Missing or non-numeric values
/// default to 1; values above `hard_cap` are treated as 1 rather than
/// trusted, since they come from corrupted markup.
pub fn parse_span(value: Option<&str>, hard_cap: u32) -> u32 {
    let Some(v) = value else { return 1 };
    let Some(n) = first_int(v) else { return 1 };
    if n > hard_cap {
        1
    } else {
        n.max(1)
    }
}

// ── Tests ──
