//! Price extraction from heterogeneous source records.
//!
//! Sources disagree on where the price lives. Direct fields are tried first,
//! in order: `price`, `current_price`, `unit_price`, `price_per_kg`. Then the
//! nested maps `price_comparison` (`{network: {"price": ..}}`) and
//! `network_prices` (`{network: price}`) are scanned in document order.
//!
//! Each candidate may be a JSON number or a string such as `"89.90 ₪"` or
//! `"1,299"`. A candidate is accepted only if it lies strictly inside the
//! configured bounds; anything else moves on to the next candidate.

use basar_core::RawProductRecord;
use serde_json::Value;

use crate::error::EngineError;

const DIRECT_FIELDS: [&str; 4] = ["price", "current_price", "unit_price", "price_per_kg"];
const NESTED_FIELDS: [&str; 2] = ["price_comparison", "network_prices"];

/// Currency markers stripped from price text before parsing.
const CURRENCY_MARKERS: [&str; 4] = ["₪", "ש\"ח", "ש״ח", "nis"];

/// Exclusive price bounds. Defaults to `(0, 2000)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBounds {
    pub min: f64,
    pub max: f64,
}

impl PriceBounds {
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSetting`] unless both bounds are finite
    /// and `min < max`.
    pub fn new(min: f64, max: f64) -> Result<Self, EngineError> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(EngineError::InvalidSetting {
                setting: "price_bounds".to_string(),
                reason: format!("expected finite min < max, got ({min}, {max})"),
            });
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub fn contains(&self, price: f64) -> bool {
        price.is_finite() && price > self.min && price < self.max
    }
}

impl Default for PriceBounds {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 2000.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PriceExtractor {
    bounds: PriceBounds,
}

impl PriceExtractor {
    #[must_use]
    pub fn new(bounds: PriceBounds) -> Self {
        Self { bounds }
    }

    #[must_use]
    pub fn bounds(&self) -> PriceBounds {
        self.bounds
    }

    /// First in-bounds price found on the record, or `None`.
    #[must_use]
    pub fn extract(&self, record: &RawProductRecord) -> Option<f64> {
        let direct = DIRECT_FIELDS
            .iter()
            .filter_map(|field| record.field(field))
            .filter_map(parse_price_value);

        let nested = NESTED_FIELDS
            .iter()
            .filter_map(|field| record.field(field))
            .filter_map(Value::as_object)
            .flat_map(|map| map.values())
            .filter_map(nested_price_value)
            .filter_map(parse_price_value);

        direct.chain(nested).find(|p| self.bounds.contains(*p))
    }
}

/// Per-network entries are either an object carrying `price` or the price
/// itself.
fn nested_price_value(entry: &Value) -> Option<&Value> {
    match entry {
        Value::Object(map) => map.get("price"),
        Value::Number(_) | Value::String(_) => Some(entry),
        _ => None,
    }
}

/// Reads a JSON number or price text as `f64`.
#[must_use]
pub fn parse_price_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_price_text(s),
        _ => None,
    }
}

/// Parses price text after removing currency markers, thousands separators
/// and whitespace. Text with anything else left over is rejected.
#[must_use]
pub fn parse_price_text(text: &str) -> Option<f64> {
    let mut cleaned = text.to_lowercase();
    for marker in CURRENCY_MARKERS {
        cleaned = cleaned.replace(marker, "");
    }
    let cleaned: String = cleaned
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|p| p.is_finite())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> RawProductRecord {
        serde_json::from_value(value).unwrap()
    }

    fn extract(value: Value) -> Option<f64> {
        PriceExtractor::default().extract(&record(value))
    }

    #[test]
    fn numeric_price_field() {
        assert_eq!(extract(json!({"name": "x", "price": 89.9})), Some(89.9));
    }

    #[test]
    fn string_price_with_currency_and_commas() {
        assert_eq!(extract(json!({"price": "1,299.50 ₪"})), Some(1299.5));
        assert_eq!(extract(json!({"price": "45.90 ש\"ח"})), Some(45.9));
        assert_eq!(extract(json!({"price": " 32 "})), Some(32.0));
    }

    #[test]
    fn direct_fields_are_tried_in_order() {
        let value = json!({"price_per_kg": 50.0, "current_price": 40.0, "unit_price": 30.0});
        assert_eq!(extract(value), Some(40.0));
    }

    #[test]
    fn out_of_range_candidate_falls_through() {
        let value = json!({"price": 5000, "current_price": 0, "unit_price": 79.9});
        assert_eq!(extract(value), Some(79.9));
    }

    #[test]
    fn bounds_are_exclusive() {
        assert_eq!(extract(json!({"price": 0})), None);
        assert_eq!(extract(json!({"price": 2000})), None);
        assert_eq!(extract(json!({"price": 1999.99})), Some(1999.99));
    }

    #[test]
    fn negative_price_is_rejected() {
        assert_eq!(extract(json!({"price": -4.5})), None);
    }

    #[test]
    fn unparseable_text_is_rejected() {
        assert_eq!(extract(json!({"price": "בקרוב"})), None);
        assert_eq!(extract(json!({"price": "₪"})), None);
        assert_eq!(extract(json!({"price": "89.9 לק\"ג"})), None);
    }

    #[test]
    fn null_and_non_scalar_values_are_skipped() {
        let value = json!({"price": null, "current_price": [1, 2], "unit_price": {"v": 3}, "price_per_kg": 61.5});
        assert_eq!(extract(value), Some(61.5));
    }

    #[test]
    fn nested_price_comparison_objects() {
        let value = json!({
            "name": "שוקיים עוף",
            "price_comparison": {
                "rami_levy": {"price": 9999},
                "victory": {"price": "28.90"}
            }
        });
        assert_eq!(extract(value), Some(28.9));
    }

    #[test]
    fn nested_network_prices_numbers() {
        let value = json!({"network_prices": {"shufersal": 31.5, "mega": 29.0}});
        assert_eq!(extract(value), Some(31.5));
    }

    #[test]
    fn direct_field_beats_nested_map() {
        let value = json!({"price_comparison": {"mega": {"price": 10}}, "price": 12});
        assert_eq!(extract(value), Some(12.0));
    }

    #[test]
    fn missing_price_is_none() {
        assert_eq!(extract(json!({"name": "עוף"})), None);
    }

    #[test]
    fn custom_bounds() {
        let extractor = PriceExtractor::new(PriceBounds::new(10.0, 100.0).unwrap());
        assert_eq!(extractor.extract(&record(json!({"price": 5, "unit_price": 50}))), Some(50.0));
    }

    #[test]
    fn inverted_bounds_rejected() {
        assert!(PriceBounds::new(100.0, 10.0).is_err());
        assert!(PriceBounds::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn parse_price_text_rejects_nan_and_inf() {
        assert_eq!(parse_price_text("NaN"), None);
        assert_eq!(parse_price_text("inf"), None);
    }
}
