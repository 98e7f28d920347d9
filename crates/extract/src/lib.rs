//! Free-text parameter extraction for room descriptions.
//!
//! Turns requests like "light up an office 45 m2, ceiling height 3.2,
//! budget 20000" into a structured `RoomParameters`. Extraction is total:
//! every signal that is absent or unparseable falls back to the documented
//! default, so this module never fails.
//!
//! Numeric extraction is driven by ordered pattern tables tried in sequence
//! with first-match-wins semantics. Explicit keyword phrasings ("area 30")
//! come before looser number-plus-unit heuristics ("30 m2"), so sentences
//! with several numbers resolve deterministically.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use luxrec_model::RoomParameters;

/// Colloquial single-word room nouns mapped to canonical room-type labels.
static ROOM_UNIGRAMS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("office", "office"),
        ("kitchen", "kitchen"),
        ("lounge", "living room"),
        ("bedroom", "bedroom"),
        ("workshop", "workshop"),
        ("restaurant", "restaurant"),
        ("cafe", "cafe"),
        ("warehouse", "warehouse"),
        ("storeroom", "warehouse"),
        ("auditorium", "auditorium"),
        ("classroom", "auditorium"),
        ("corridor", "corridor"),
        ("hallway", "corridor"),
        ("lobby", "lobby"),
        ("vestibule", "lobby"),
        ("bathroom", "bathroom"),
        ("restroom", "bathroom"),
        ("washroom", "bathroom"),
        ("lab", "laboratory"),
        ("laboratory", "laboratory"),
        ("shop", "shop"),
        ("store", "shop"),
    ])
});

/// Two-word room phrases, checked before the unigram table at each position.
/// Keys are lemmatized forms, since lookup happens after plural stripping
/// ("sales floor" arrives as "sale floor").
static ROOM_BIGRAMS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("living room", "living room"),
        ("sale floor", "sales floor"),
        ("trading floor", "sales floor"),
        ("shop floor", "workshop"),
        ("lecture hall", "auditorium"),
    ])
});

/// Area patterns: explicit keyword first, then number adjacent to a unit.
static AREA_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?:floor\s+)?area[a-z :]{0,16}(\d+(?:\.\d+)?)",
        r"(\d+(?:\.\d+)?)\s*(?:m2|m²|sq\.?\s*m\b|sqm\b|square\s+met(?:er|re)s?)",
    ])
});

/// Ceiling-height patterns, keyword-then-number before number-then-keyword.
static HEIGHT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?:ceiling\s+)?height[a-z :]{0,12}(\d+(?:\.\d+)?)",
        r"ceilings?[a-z :]{0,12}(\d+(?:\.\d+)?)",
        r"(\d+(?:\.\d+)?)\s*(?:m|met(?:er|re)s?)?\s*(?:high|tall|ceilings?)\b",
    ])
});

/// Budget patterns: keyword first, then number adjacent to a currency marker.
static BUDGET_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"budget[a-z :]{0,12}(\d+(?:\.\d+)?)",
        r"(\d+(?:\.\d+)?)\s*(?:usd|dollars?|bucks|rub(?:les?)?|eur(?:os?)?|₽|€|\$)",
        r"[$€₽]\s*(\d+(?:\.\d+)?)",
    ])
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("invalid extraction pattern"))
        .collect()
}

/// Extract room parameters from a free-text request.
///
/// Never fails: any absent or ambiguous signal produces the documented
/// default instead. See `RoomParameters` for the defaults.
pub fn extract(text: &str) -> RoomParameters {
    let normalized = normalize(text);
    let defaults = RoomParameters::default();

    let params = RoomParameters {
        room_type: detect_room_type(&normalized),
        area_m2: first_capture(&AREA_PATTERNS, &normalized).unwrap_or(defaults.area_m2),
        ceiling_height_m: first_capture(&HEIGHT_PATTERNS, &normalized)
            .unwrap_or(defaults.ceiling_height_m),
        budget: first_capture(&BUDGET_PATTERNS, &normalized)
            .map(|v| v as u64)
            .unwrap_or(defaults.budget),
        ..defaults
    }
    .normalized();

    tracing::debug!(?params, "extracted room parameters");
    params
}

/// Lowercase and unify decimal separators (comma to period).
fn normalize(text: &str) -> String {
    text.to_lowercase().replace(',', ".")
}

/// Find the canonical room type for the first token (or token pair) whose
/// lemma appears in the lexicon. Defaults to "office".
fn detect_room_type(normalized: &str) -> String {
    let tokens: Vec<String> = normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(lemma)
        .collect();

    for (i, token) in tokens.iter().enumerate() {
        if let Some(next) = tokens.get(i + 1) {
            let phrase = format!("{token} {next}");
            if let Some(canonical) = ROOM_BIGRAMS.get(phrase.as_str()) {
                return canonical.to_string();
            }
        }
        if let Some(canonical) = ROOM_UNIGRAMS.get(token.as_str()) {
            return canonical.to_string();
        }
    }

    RoomParameters::default().room_type
}

/// Light plural-stripping lemmatizer, enough for the closed room lexicon.
fn lemma(token: &str) -> String {
    if token.len() > 4 && token.ends_with("ies") {
        return format!("{}y", &token[..token.len() - 3]);
    }
    if token.len() > 4
        && (token.ends_with("ses")
            || token.ends_with("xes")
            || token.ends_with("ches")
            || token.ends_with("shes"))
    {
        return token[..token.len() - 2].to_string();
    }
    if token.len() > 3 && token.ends_with('s') && !token.ends_with("ss") {
        return token[..token.len() - 1].to_string();
    }
    token.to_string()
}

/// Try each pattern in declared order; return the first capture that parses
/// to a finite positive number. Malformed captures count as no match and
/// fall through to the next pattern.
fn first_capture(patterns: &[Regex], text: &str) -> Option<f64> {
    for pattern in patterns {
        if let Some(caps) = pattern.captures(text) {
            if let Ok(value) = caps[1].parse::<f64>() {
                if value.is_finite() && value > 0.0 {
                    return Some(value);
                }
            }
        }
    }
    None
}
