//! Text normalization helpers: grouping-key normalization, handle slugs,
//! and SKU canonicalization.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("valid non-word regex"));
static NON_ALNUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid non-alnum regex"));

/// NFD-decomposes and drops combining diacritical marks (U+0300..U+036F),
/// so `"è"` folds to `"e"`.
#[must_use]
pub fn strip_diacritics(s: &str) -> String {
    s.nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect()
}

/// Normalization used for derived grouping keys (`titlebrand`):
/// lower-case, diacritics stripped, non-word runs collapsed to single
/// spaces, trimmed.
#[must_use]
pub fn normalize_key_text(s: &str) -> String {
    let folded = strip_diacritics(&s.to_lowercase());
    NON_WORD_RE.replace_all(&folded, " ").trim().to_string()
}

/// URL-handle slug: lower-case, diacritics stripped, non-alphanumeric runs
/// collapsed to single hyphens, leading/trailing hyphens trimmed.
#[must_use]
pub fn slugify(s: &str) -> String {
    let folded = strip_diacritics(&s.to_lowercase());
    NON_ALNUM_RE
        .replace_all(&folded, "-")
        .trim_matches('-')
        .to_string()
}

/// Canonical SKU form used as the reconciliation natural key: trimmed, all
/// whitespace removed, upper-cased.
#[must_use]
pub fn normalize_sku(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}
