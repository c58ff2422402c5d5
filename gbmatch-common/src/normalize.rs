//! Taxonomic name normalization
//!
//! Names arrive in several dialects: `Amanita sp-S19`, `Amanita sp. S19` and
//! `Amanita sp S19` all denote the same undetermined species with a
//! provisional tag. [`normalize`] maps each dialect onto one comparison form.
//! The result is only ever compared for equality; it is never displayed.

use once_cell::sync::Lazy;
use regex::Regex;

/// `sp-`, `sp.` or `sp` + whitespace at the start of a word
///
/// Only matches at a word start: `Xwasp foo` is left alone, while
/// `Amanita sp foo` loses its marker.
static SPECIES_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bsp(?:-|\.|\s)").expect("valid species marker regex"));

/// Anything that is neither a word character nor whitespace
static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid punctuation regex"));

/// A `cf` qualifier and everything following it
static CF_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\bcf\b.*$").expect("valid cf tail regex"));

/// Qualifier tokens that carry no identity for comparison purposes
const DROPPED_TOKENS: [&str; 2] = ["cf", "subsp"];

/// Map an optional raw name onto its canonical comparison string
///
/// Absent input normalizes to the empty string.
pub fn normalize_opt(raw: Option<&str>) -> String {
    raw.map(normalize).unwrap_or_default()
}

/// Map a raw taxonomic name onto its canonical comparison string
///
/// Rules, applied in order:
/// 1. Every `sp-`, `sp.` or `sp<whitespace>` marker becomes a single space
/// 2. Non-word, non-whitespace characters are removed
/// 3. Standalone `cf` and `subsp` tokens are removed
/// 4. Whitespace runs collapse to one space, ends are trimmed
///
/// Removing punctuation can expose a fresh marker (`s.p x` becomes `sp x`),
/// so rule 1 runs once more after rule 2. This keeps the function idempotent.
pub fn normalize(raw: &str) -> String {
    let unmarked = SPECIES_MARKER.replace_all(raw, " ");
    let bare = PUNCTUATION.replace_all(&unmarked, "");
    let bare = SPECIES_MARKER.replace_all(&bare, " ");

    bare.split_whitespace()
        .filter(|token| !DROPPED_TOKENS.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trim and collapse whitespace without touching anything else
///
/// Used for display strings, which keep their punctuation and qualifiers.
pub fn tidy(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when a name has no species epithet (a single token)
pub fn is_genus_only(name: &str) -> bool {
    !name.trim().contains(char::is_whitespace)
}

/// Remove a `cf` qualifier and everything after it
///
/// A genus-level identification cannot be contradicted by a qualified
/// species-level note, so `Amanita cf. muscaria` compares as `Amanita`.
pub fn strip_genus_level_cf(name: &str) -> String {
    tidy(&CF_TAIL.replace(name, ""))
}
