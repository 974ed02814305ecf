//! Product category resolution.
//!
//! The upstream classifier's `meat_classification.category` wins, then a
//! plain `category` field on the record. Subcategories follow the same order.
//! Otherwise the normalized name's tokens are
//! checked against the knowledge-file categories, first category with a
//! matching keyword wins. Keywords match whole tokens, so `לב` never fires on
//! `חלב`.

use basar_core::{Knowledge, RawProductRecord};
use serde_json::Value;

use crate::normalize::NormalizedKey;

pub const UNKNOWN_CATEGORY: &str = "unknown";

#[derive(Debug, Clone)]
pub struct CategoryResolver {
    /// `(id, lowercased keywords)` in knowledge-file order.
    categories: Vec<(String, Vec<String>)>,
}

impl CategoryResolver {
    #[must_use]
    pub fn from_knowledge(knowledge: &Knowledge) -> Self {
        let categories = knowledge
            .categories
            .iter()
            .map(|c| {
                let keywords = c
                    .keywords
                    .iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect();
                (c.id.clone(), keywords)
            })
            .collect();
        Self { categories }
    }

    /// Category stated by the record itself, if any.
    #[must_use]
    pub fn declared(record: &RawProductRecord) -> Option<String> {
        classified(record, "category").or_else(|| non_blank(record.category.as_deref()))
    }

    /// Subcategory stated by the record itself. Never inferred.
    #[must_use]
    pub fn declared_subcategory(record: &RawProductRecord) -> Option<String> {
        classified(record, "subcategory")
            .or_else(|| non_blank(record.field("subcategory").and_then(Value::as_str)))
    }

    /// Category inferred from a normalized name.
    #[must_use]
    pub fn infer(&self, key: &NormalizedKey) -> Option<&str> {
        let tokens: Vec<&str> = key.tokens().collect();
        self.categories
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| tokens.contains(&k.as_str())))
            .map(|(id, _)| id.as_str())
    }

    #[must_use]
    pub fn resolve(&self, record: &RawProductRecord, key: &NormalizedKey) -> String {
        Self::declared(record)
            .or_else(|| self.infer(key).map(str::to_string))
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
    }
}

fn classified(record: &RawProductRecord, key: &str) -> Option<String> {
    non_blank(
        record
            .field("meat_classification")
            .and_then(|c| c.get(key))
            .and_then(Value::as_str),
    )
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::normalize::NameNormalizer;

    fn setup() -> (CategoryResolver, NameNormalizer) {
        let knowledge = Knowledge::bundled().unwrap();
        (
            CategoryResolver::from_knowledge(&knowledge),
            NameNormalizer::from_knowledge(&knowledge),
        )
    }

    fn resolve(value: serde_json::Value) -> String {
        let (categories, normalizer) = setup();
        let record: RawProductRecord = serde_json::from_value(value).unwrap();
        let key = normalizer.normalize(&record.name);
        categories.resolve(&record, &key)
    }

    #[test]
    fn declared_category_beats_inference() {
        assert_eq!(resolve(json!({"name": "חזה עוף", "category": "poultry"})), "poultry");
    }

    #[test]
    fn classifier_category_is_used_alone() {
        let value = json!({"name": "חזה עוף", "meat_classification": {"category": "עוף"}});
        assert_eq!(resolve(value), "עוף");
    }

    #[test]
    fn classifier_category_beats_plain_field() {
        let value = json!({
            "name": "חזה עוף",
            "category": "meat",
            "meat_classification": {"category": "chicken"}
        });
        assert_eq!(resolve(value), "chicken");
    }

    #[test]
    fn blank_classifier_category_falls_back_to_field() {
        let value = json!({
            "name": "חזה עוף",
            "category": "poultry",
            "meat_classification": {"category": "  "}
        });
        assert_eq!(resolve(value), "poultry");
    }

    #[test]
    fn subcategory_from_classifier_then_field() {
        let record = |value| serde_json::from_value::<RawProductRecord>(value).unwrap();
        let both = record(json!({
            "name": "חזה עוף",
            "subcategory": "breast",
            "meat_classification": {"subcategory": "חזה"}
        }));
        assert_eq!(CategoryResolver::declared_subcategory(&both).as_deref(), Some("חזה"));

        let plain = record(json!({"name": "חזה עוף", "subcategory": "breast"}));
        assert_eq!(CategoryResolver::declared_subcategory(&plain).as_deref(), Some("breast"));

        let none = record(json!({"name": "חזה עוף"}));
        assert_eq!(CategoryResolver::declared_subcategory(&none), None);
    }

    #[test]
    fn inferred_from_name_tokens() {
        assert_eq!(resolve(json!({"name": "אנטריקוט בקר טרי"})), "beef");
        assert_eq!(resolve(json!({"name": "Chicken Wings 1kg"})), "chicken");
    }

    #[test]
    fn first_matching_category_wins() {
        // "הודו" (turkey) is listed before chicken keywords
        assert_eq!(resolve(json!({"name": "חזה הודו"})), "turkey");
    }

    #[test]
    fn keywords_do_not_match_inside_tokens() {
        assert_eq!(resolve(json!({"name": "חלב 3%"})), UNKNOWN_CATEGORY);
    }

    #[test]
    fn unknown_when_nothing_matches() {
        assert_eq!(resolve(json!({"name": "אורז בסמטי"})), UNKNOWN_CATEGORY);
    }
}
