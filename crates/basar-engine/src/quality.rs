//! Per-record quality score (0-100).
//!
//! Upstream classifiers attach their own confidence in different places, so
//! the first signal found wins:
//!
//! 1. a top-level `quality_score`;
//! 2. `meat_classification.quality_score`;
//! 3. `confidence`, a 0-1 fraction scaled to 0-100;
//! 4. 50 for a record with both a name and a price;
//! 5. 0.
//!
//! Scores are clamped into `[0, 100]`.

use basar_core::RawProductRecord;
use serde_json::Value;

use crate::price::parse_price_value;

pub const MAX_QUALITY: f64 = 100.0;
pub const BASELINE_QUALITY: f64 = 50.0;

#[must_use]
pub fn record_quality(record: &RawProductRecord, has_price: bool) -> f64 {
    let explicit = record
        .field("quality_score")
        .and_then(parse_price_value)
        .or_else(|| {
            record
                .field("meat_classification")
                .and_then(|c| c.get("quality_score"))
                .and_then(parse_price_value)
        })
        .or_else(|| {
            record
                .field("confidence")
                .and_then(Value::as_f64)
                .map(|c| c * MAX_QUALITY)
        })
        .filter(|q| q.is_finite());

    let score = match explicit {
        Some(q) => q,
        None if has_price && !record.name.trim().is_empty() => BASELINE_QUALITY,
        None => 0.0,
    };
    score.clamp(0.0, MAX_QUALITY)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn quality(value: Value, has_price: bool) -> f64 {
        let record: RawProductRecord = serde_json::from_value(value).unwrap();
        record_quality(&record, has_price)
    }

    #[test]
    fn explicit_quality_score_wins() {
        let q = quality(
            json!({"quality_score": 92, "meat_classification": {"quality_score": 40}, "confidence": 0.1}),
            true,
        );
        assert!((q - 92.0).abs() < f64::EPSILON);
    }

    #[test]
    fn classification_quality_score() {
        let q = quality(json!({"meat_classification": {"quality_score": "77.5"}}), false);
        assert!((q - 77.5).abs() < f64::EPSILON);
    }

    #[test]
    fn confidence_is_scaled() {
        let q = quality(json!({"name": "עוף", "confidence": 0.85}), true);
        assert!((q - 85.0).abs() < 1e-9);
    }

    #[test]
    fn baseline_for_named_priced_record() {
        assert!((quality(json!({"name": "עוף"}), true) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_without_price_or_name() {
        assert!(quality(json!({"name": "עוף"}), false).abs() < f64::EPSILON);
        assert!(quality(json!({"name": "  "}), true).abs() < f64::EPSILON);
    }

    #[test]
    fn scores_are_clamped() {
        assert!((quality(json!({"quality_score": 250}), true) - 100.0).abs() < f64::EPSILON);
        assert!(quality(json!({"confidence": -0.5}), true).abs() < f64::EPSILON);
    }
}
