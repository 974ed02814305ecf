//! Turns a [`ProductCluster`] into a [`UnifiedProduct`].

use std::cmp::Ordering;

use basar_core::{PriceEntry, PriceTable, UnifiedProduct};
use sha2::{Digest, Sha256};

use crate::category::{CategoryResolver, UNKNOWN_CATEGORY};
use crate::linker::ProductCluster;
use crate::record::PreparedRecord;
use crate::savings::analyze_savings;

const ID_PREFIX: &str = "unified_";
const ID_HEX_LEN: usize = 12;

#[derive(Debug, Clone)]
pub struct UnifiedProductBuilder {
    categories: CategoryResolver,
    significant_savings_percent: f64,
}

impl UnifiedProductBuilder {
    #[must_use]
    pub fn new(categories: CategoryResolver, significant_savings_percent: f64) -> Self {
        Self {
            categories,
            significant_savings_percent,
        }
    }

    /// Builds the product for `cluster`, whose member indices point into
    /// `records`.
    ///
    /// Returns `None` when no member carries both a valid price and a known
    /// network. Such clusters are dropped, never emitted empty.
    #[must_use]
    pub fn build(&self, cluster: &ProductCluster, records: &[PreparedRecord]) -> Option<UnifiedProduct> {
        let members: Vec<&PreparedRecord> = cluster
            .member_indices()
            .filter_map(|i| records.get(i))
            .collect();

        let price_table = build_price_table(&members);
        if price_table.is_empty() {
            tracing::debug!(
                key = %cluster.representative,
                members = members.len(),
                "cluster has no priced offers, dropping"
            );
            return None;
        }

        let canonical = canonical_member(&members)?;
        let quality_score = members.iter().map(|m| m.quality).fold(0.0, f64::max);
        let category = self.category_for(canonical, &members, cluster);
        let subcategory = CategoryResolver::declared_subcategory(&canonical.record).or_else(|| {
            members
                .iter()
                .find_map(|m| CategoryResolver::declared_subcategory(&m.record))
        });
        let savings_analysis = analyze_savings(&price_table, self.significant_savings_percent);

        Some(UnifiedProduct::new(
            product_id(cluster.representative.as_str()),
            canonical.record.name.trim().to_string(),
            cluster.representative.as_str().to_string(),
            category,
            price_table,
            savings_analysis,
            quality_score,
            members.len(),
        )
        .with_subcategory(subcategory))
    }

    fn category_for(
        &self,
        canonical: &PreparedRecord,
        members: &[&PreparedRecord],
        cluster: &ProductCluster,
    ) -> String {
        CategoryResolver::declared(&canonical.record)
            .or_else(|| members.iter().find_map(|m| CategoryResolver::declared(&m.record)))
            .or_else(|| {
                self.categories
                    .infer(&cluster.representative)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
    }
}

/// One entry per network, keeping the lowest price. Networks appear in the
/// order their first priced member was seen.
fn build_price_table(members: &[&PreparedRecord]) -> PriceTable {
    let mut table = PriceTable::new();
    for member in members {
        let Some(price) = member.price else { continue };
        if member.network.is_unknown() {
            continue;
        }

        let candidate = PriceEntry {
            network: member.network.clone(),
            price,
            unit: member.record.unit.clone().unwrap_or_default(),
            quality_score: member.quality,
            source: member.source_ref(),
            product_id: member.product_id(),
        };

        match table.get_mut(&member.network) {
            Some(existing) if price < existing.price => *existing = candidate,
            Some(_) => {}
            None => {
                table.insert(member.network.clone(), candidate);
            }
        }
    }
    table
}

/// Highest quality, then the longest name, then the first member.
fn canonical_member<'a>(members: &[&'a PreparedRecord]) -> Option<&'a PreparedRecord> {
    let mut best: Option<&PreparedRecord> = None;
    for &member in members {
        let better = best.is_none_or(|current| match member.quality.partial_cmp(&current.quality) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Equal) => name_len(member) > name_len(current),
            _ => false,
        });
        if better {
            best = Some(member);
        }
    }
    best
}

fn name_len(record: &PreparedRecord) -> usize {
    record.record.name.trim().chars().count()
}

/// `unified_` followed by the first 12 hex digits of the key's SHA-256.
#[must_use]
pub fn product_id(representative: &str) -> String {
    let hex = format!("{:x}", Sha256::digest(representative.as_bytes()));
    format!("{ID_PREFIX}{}", &hex[..ID_HEX_LEN])
}

#[cfg(test)]
#[path = "unified_test.rs"]
mod tests;
