//! StoreGest API shapes.
//!
//! The `act=qta` endpoint returns `{"data": [{"SKU": "...", "Qta": ...}]}`
//! but field casing drifts across installations (`SKU`/`Sku`/`sku`,
//! `Qta`/`qta`/`qty`) and quantities arrive as numbers or as strings with a
//! decimal comma. Decoding is tolerant of all observed spellings.

use serde::{Deserialize, Deserializer};

/// Response envelope for `act=qta`. A missing `data` field decodes as an
/// empty row set.
#[derive(Debug, Deserialize)]
pub(crate) struct QtaResponse {
    #[serde(default)]
    pub data: Vec<StockRow>,
}

/// One quantity-on-hand row keyed by SKU.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StockRow {
    #[serde(default, alias = "SKU", alias = "Sku")]
    pub sku: String,
    #[serde(
        default,
        alias = "Qta",
        alias = "qta",
        alias = "qty",
        deserialize_with = "lenient_quantity"
    )]
    pub quantity: i64,
}

/// Accepts a JSON number or a numeric string (decimal comma tolerated);
/// anything unparsable or negative clamps to zero.
fn lenient_quantity<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(quantity_from_value(&value))
}

#[allow(clippy::cast_possible_truncation)]
fn quantity_from_value(value: &serde_json::Value) -> i64 {
    let parsed = match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        serde_json::Value::String(s) => s
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .map(|f| f.trunc() as i64),
        _ => None,
    };
    parsed.unwrap_or(0).max(0)
}
