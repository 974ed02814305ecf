use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Canonical identifier for a retail chain, e.g. `"rami_levy"`.
///
/// Records whose network cannot be determined carry [`NetworkId::UNKNOWN`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(String);

impl NetworkId {
    pub const UNKNOWN: &'static str = "unknown";

    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    #[must_use]
    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NetworkId {
    fn default() -> Self {
        Self::unknown()
    }
}

impl std::fmt::Display for NetworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One listing from one source, as supplied by a data-acquisition collaborator.
///
/// Only the fields the engine interprets are typed. Price fields, nested price
/// maps, and anything else the source carries stay in `extra` untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawProductRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub unit: Option<String>,
    /// Explicit network id, the most trusted identity signal.
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub network: Option<String>,
    /// Free-text provenance: a retailer name, a feed file name, a URL.
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub category: Option<String>,
    /// Name of the input document this record was read from. Set by the
    /// input adapter, never by the source data itself.
    #[serde(skip)]
    pub origin: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawProductRecord {
    /// Returns a passthrough field by key, e.g. `"price_per_kg"`.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key).filter(|v| !v.is_null())
    }
}

/// Accepts strings and numbers; everything else becomes an empty string.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// The best known offer for a product at one network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    /// Also the key of the owning [`PriceTable`]; not repeated in JSON.
    #[serde(skip)]
    pub network: NetworkId,
    pub price: f64,
    pub unit: String,
    pub quality_score: f64,
    /// Provenance of the winning record (its `source`, else its origin).
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
}

/// Per-network offers in first-seen order. Iteration order is deterministic,
/// which fixes the tie-break for cheapest and most expensive network.
pub type PriceTable = IndexMap<NetworkId, PriceEntry>;

/// Price spread across a product's networks. Only defined for two or more
/// offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsAnalysis {
    pub min_price: f64,
    pub max_price: f64,
    pub avg_price: f64,
    pub absolute_savings: f64,
    pub percent_savings: f64,
    pub cheapest_network: NetworkId,
    pub most_expensive_network: NetworkId,
    pub volatility_percent: f64,
    pub significant_savings: bool,
}

/// A merged catalog entry for one physical product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiedProduct {
    pub id: String,
    pub canonical_name: String,
    pub normalized_name: String,
    pub category: String,
    /// Finer grouping supplied by an upstream classifier, e.g. a cut name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub price_table: PriceTable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings_analysis: Option<SavingsAnalysis>,
    /// Highest individual quality score among the cluster's records (0-100).
    pub quality_score: f64,
    pub is_cross_network: bool,
    /// Raw records merged into this product, priced or not.
    pub member_count: usize,
}

impl UnifiedProduct {
    /// Builds a product, deriving `is_cross_network` from the price table.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        id: String,
        canonical_name: String,
        normalized_name: String,
        category: String,
        price_table: PriceTable,
        savings_analysis: Option<SavingsAnalysis>,
        quality_score: f64,
        member_count: usize,
    ) -> Self {
        let is_cross_network = price_table.len() >= 2;
        Self {
            id,
            canonical_name,
            normalized_name,
            category,
            subcategory: None,
            price_table,
            savings_analysis,
            quality_score,
            is_cross_network,
            member_count,
        }
    }

    #[must_use]
    pub fn with_subcategory(mut self, subcategory: Option<String>) -> Self {
        self.subcategory = subcategory;
        self
    }

    #[must_use]
    pub fn network_count(&self) -> usize {
        self.price_table.len()
    }

    /// Returns the cheapest offer, first-seen on ties.
    #[must_use]
    pub fn cheapest_offer(&self) -> Option<&PriceEntry> {
        self.price_table
            .values()
            .fold(None, |best: Option<&PriceEntry>, entry| match best {
                Some(b) if b.price <= entry.price => Some(b),
                _ => Some(entry),
            })
    }

    /// Absolute savings, or `0.0` for single-network products.
    #[must_use]
    pub fn savings_amount(&self) -> f64 {
        self.savings_analysis
            .as_ref()
            .map_or(0.0, |s| s.absolute_savings)
    }

    #[must_use]
    pub fn has_significant_savings(&self) -> bool {
        self.savings_analysis
            .as_ref()
            .is_some_and(|s| s.significant_savings)
    }
}

/// Per-category slice of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub count: usize,
    /// Mean absolute savings over every product in the category, single
    /// network products counting as zero.
    pub avg_savings: f64,
    pub cross_network_count: usize,
}

/// A cross-network product worth highlighting for its price spread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsOpportunity {
    pub product_id: String,
    pub name: String,
    pub savings_amount: f64,
    pub savings_percentage: f64,
    pub cheapest_network: NetworkId,
    pub most_expensive_network: NetworkId,
    pub networks_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogMetadata {
    pub total_products: usize,
    pub cross_network_products: usize,
    pub networks_covered: usize,
    pub total_savings_potential: f64,
    pub avg_savings_per_product: f64,
    /// Products whose absolute savings are above zero.
    pub products_with_savings: usize,
    pub significant_savings_products: usize,
    /// Number of products offered by each network, keyed by network id.
    pub products_per_network: BTreeMap<String, usize>,
    pub category_analysis: BTreeMap<String, CategoryStats>,
    /// Largest absolute savings first.
    pub top_savings_opportunities: Vec<SavingsOpportunity>,
    pub generated_at: DateTime<Utc>,
}

/// The single externally consumed artifact of a unification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub products: Vec<UnifiedProduct>,
    pub metadata: CatalogMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(network: &str, price: f64) -> PriceEntry {
        PriceEntry {
            network: NetworkId::new(network),
            price,
            unit: "ק״ג".to_string(),
            quality_score: 50.0,
            source: format!("{network}.json"),
            product_id: None,
        }
    }

    fn table(entries: &[(&str, f64)]) -> PriceTable {
        entries
            .iter()
            .map(|(n, p)| (NetworkId::new(n), entry(n, *p)))
            .collect()
    }

    fn product(price_table: PriceTable) -> UnifiedProduct {
        UnifiedProduct::new(
            "unified_abc".to_string(),
            "אנטריקוט בקר".to_string(),
            "אנטריקוט בקר".to_string(),
            "beef".to_string(),
            price_table,
            None,
            50.0,
            2,
        )
    }

    #[test]
    fn network_id_unknown_sentinel() {
        assert!(NetworkId::unknown().is_unknown());
        assert!(NetworkId::default().is_unknown());
        assert!(!NetworkId::new("victory").is_unknown());
        assert_eq!(NetworkId::unknown().to_string(), "unknown");
    }

    #[test]
    fn cross_network_flag_follows_table_size() {
        assert!(!product(table(&[("victory", 89.9)])).is_cross_network);
        assert!(product(table(&[("victory", 89.9), ("rami_levy", 79.9)])).is_cross_network);
    }

    #[test]
    fn cheapest_offer_prefers_first_seen_on_tie() {
        let p = product(table(&[("victory", 10.0), ("mega", 10.0), ("shufersal", 12.0)]));
        assert_eq!(p.cheapest_offer().unwrap().network.as_str(), "victory");
    }

    #[test]
    fn cheapest_offer_none_for_empty_table() {
        assert!(product(PriceTable::new()).cheapest_offer().is_none());
    }

    #[test]
    fn subcategory_serialized_only_when_present() {
        let plain = serde_json::to_value(product(table(&[("victory", 89.9)]))).unwrap();
        assert!(plain.get("subcategory").is_none());

        let cut = product(table(&[("victory", 89.9)])).with_subcategory(Some("entrecote".to_string()));
        assert_eq!(serde_json::to_value(cut).unwrap()["subcategory"], "entrecote");
    }

    #[test]
    fn savings_amount_zero_without_analysis() {
        let p = product(table(&[("victory", 89.9)]));
        assert!(p.savings_amount().abs() < f64::EPSILON);
        assert!(!p.has_significant_savings());
    }

    #[test]
    fn raw_record_deserializes_typed_and_passthrough_fields() {
        let record: RawProductRecord = serde_json::from_value(serde_json::json!({
            "name": "אנטריקוט בקר",
            "price": "89.90",
            "network": "victory",
            "item_code": "7290000000001",
            "unit": null
        }))
        .unwrap();
        assert_eq!(record.name, "אנטריקוט בקר");
        assert_eq!(record.network.as_deref(), Some("victory"));
        assert!(record.unit.is_none());
        assert_eq!(
            record.field("price").and_then(Value::as_str),
            Some("89.90")
        );
        assert!(record.field("item_code").is_some());
        assert!(record.origin.is_none());
    }

    #[test]
    fn raw_record_tolerates_numeric_and_blank_strings() {
        let record: RawProductRecord = serde_json::from_value(serde_json::json!({
            "name": 12345,
            "source": "   ",
            "category": ["not", "a", "string"]
        }))
        .unwrap();
        assert_eq!(record.name, "12345");
        assert!(record.source.is_none());
        assert!(record.category.is_none());
    }

    #[test]
    fn raw_record_missing_name_defaults_to_empty() {
        let record: RawProductRecord =
            serde_json::from_value(serde_json::json!({ "price": 5.9 })).unwrap();
        assert!(record.name.is_empty());
    }

    #[test]
    fn price_table_serializes_as_map_keyed_by_network() {
        let p = product(table(&[("victory", 89.9), ("rami_levy", 79.9)]));
        let json = serde_json::to_value(&p).unwrap();
        let table = json["price_table"].as_object().unwrap();
        let keys: Vec<&str> = table.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["victory", "rami_levy"]);
        assert_eq!(table["victory"]["price"], 89.9);
        assert_eq!(table["victory"]["source"], "victory.json");
        assert!(table["victory"].get("network").is_none());
        assert!(table["victory"].get("product_id").is_none());
        assert!(json.get("savings_analysis").is_none());
    }
}
