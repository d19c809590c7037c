//! Currency-aware price parsing.
//!
//! Merchant feeds carry prices as `"EUR 19,90"`, `"19.90 EUR"`, or a bare
//! number, with either decimal separator. Unparsable strings resolve to a
//! `None` value rather than an error: a bad price drops to the `"0"`
//! default downstream instead of failing the variant.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

static PREFIX_CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)([A-Z]{3})\s*([\d.]+)").expect("valid prefix regex"));
static SUFFIX_CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)([\d.]+)\s*([A-Z]{3})").expect("valid suffix regex"));

/// A parsed price: decimal value and optional ISO 4217 code, either of
/// which may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedPrice {
    pub value: Option<Decimal>,
    pub currency: Option<String>,
}

/// Parses a feed price string.
///
/// Decimal commas are converted to points first, then a 3-letter currency
/// code is recognized as prefix or suffix. Anything else falls back to a
/// lenient numeric parse that ignores stray symbols.
#[must_use]
pub fn parse_price(raw: &str) -> ParsedPrice {
    let s = raw.replace(',', ".");
    let s = s.trim();
    if s.is_empty() {
        return ParsedPrice::default();
    }

    if let Some(caps) = PREFIX_CURRENCY_RE.captures(s) {
        return ParsedPrice {
            value: Decimal::from_str(&caps[2]).ok(),
            currency: Some(caps[1].to_uppercase()),
        };
    }
    if let Some(caps) = SUFFIX_CURRENCY_RE.captures(s) {
        return ParsedPrice {
            value: Decimal::from_str(&caps[1]).ok(),
            currency: Some(caps[2].to_uppercase()),
        };
    }

    ParsedPrice {
        value: lenient_decimal(s),
        currency: None,
    }
}

/// Keeps digits, points, minus, and spaces, then attempts a decimal parse.
fn lenient_decimal(s: &str) -> Option<Decimal> {
    let filtered: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | ' '))
        .collect();
    Decimal::from_str(filtered.trim()).ok()
}
