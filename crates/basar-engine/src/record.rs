use std::cmp::Ordering;

use basar_core::{NetworkId, RawProductRecord};

use crate::normalize::NormalizedKey;

/// A raw record together with everything derived from it during ingest.
#[derive(Debug, Clone)]
pub struct PreparedRecord {
    pub record: RawProductRecord,
    /// Position of the record's source in the run's input list.
    pub source_index: usize,
    pub key: NormalizedKey,
    pub price: Option<f64>,
    pub network: NetworkId,
    pub quality: f64,
}

impl PreparedRecord {
    /// Whether the record can contribute a price-table entry.
    #[must_use]
    pub fn is_priced(&self) -> bool {
        self.price.is_some() && !self.network.is_unknown()
    }

    /// Provenance string: the record's `source`, else the input document name.
    #[must_use]
    pub fn source_ref(&self) -> String {
        self.record
            .source
            .clone()
            .or_else(|| self.record.origin.clone())
            .unwrap_or_default()
    }

    /// Upstream product identifier (`item_code`, else `id`).
    #[must_use]
    pub fn product_id(&self) -> Option<String> {
        ["item_code", "id"].iter().find_map(|key| {
            self.record.field(key).and_then(|v| match v {
                serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
        })
    }

    /// `true` if `self` should be kept over `other` when both describe the
    /// same listing: higher quality first, then the lower price.
    #[must_use]
    pub fn outranks(&self, other: &PreparedRecord) -> bool {
        match self.quality.partial_cmp(&other.quality) {
            Some(Ordering::Greater) => return true,
            Some(Ordering::Less) => return false,
            _ => {}
        }
        match (self.price, other.price) {
            (Some(mine), Some(theirs)) => mine < theirs,
            (Some(_), None) => true,
            _ => false,
        }
    }
}
