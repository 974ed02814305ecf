//! Catalog assembly and summary metadata.

use std::collections::{BTreeMap, BTreeSet};

use basar_core::{
    Catalog, CatalogMetadata, CategoryStats, SavingsAnalysis, SavingsOpportunity, UnifiedProduct,
};
use chrono::{DateTime, Utc};

/// Length of `top_savings_opportunities`.
pub const TOP_SAVINGS_LIMIT: usize = 10;

/// Wraps products into a [`Catalog`], computing summary metadata.
///
/// Products keep their given order. Money totals in the metadata are rounded
/// to two decimals; per-product figures are left as computed.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn assemble_catalog(products: Vec<UnifiedProduct>, generated_at: DateTime<Utc>) -> Catalog {
    let total_products = products.len();
    let cross_network_products = products.iter().filter(|p| p.is_cross_network).count();
    let significant_savings_products = products
        .iter()
        .filter(|p| p.has_significant_savings())
        .count();

    let mut networks = BTreeSet::new();
    let mut products_per_network: BTreeMap<String, usize> = BTreeMap::new();
    for product in &products {
        for network in product.price_table.keys() {
            networks.insert(network.as_str());
            *products_per_network
                .entry(network.as_str().to_string())
                .or_default() += 1;
        }
    }

    let total_savings: f64 = products.iter().map(UnifiedProduct::savings_amount).sum();
    let avg_savings = total_savings / total_products.max(1) as f64;
    let products_with_savings = products.iter().filter(|p| p.savings_amount() > 0.0).count();

    let metadata = CatalogMetadata {
        total_products,
        cross_network_products,
        networks_covered: networks.len(),
        total_savings_potential: round_money(total_savings),
        avg_savings_per_product: round_money(avg_savings),
        products_with_savings,
        significant_savings_products,
        products_per_network,
        category_analysis: category_analysis(&products),
        top_savings_opportunities: top_savings(&products),
        generated_at,
    };

    Catalog { products, metadata }
}

/// Count, cross-network count and mean savings per category id.
#[allow(clippy::cast_precision_loss)]
fn category_analysis(products: &[UnifiedProduct]) -> BTreeMap<String, CategoryStats> {
    let mut totals: BTreeMap<&str, (usize, usize, f64)> = BTreeMap::new();
    for product in products {
        let (count, cross_network, savings) = totals.entry(product.category.as_str()).or_default();
        *count += 1;
        if product.is_cross_network {
            *cross_network += 1;
        }
        *savings += product.savings_amount();
    }

    totals
        .into_iter()
        .map(|(category, (count, cross_network_count, savings))| {
            let stats = CategoryStats {
                count,
                avg_savings: round_money(savings / count as f64),
                cross_network_count,
            };
            (category.to_string(), stats)
        })
        .collect()
}

/// Cross-network products with positive savings, largest first. Equal
/// savings keep catalog order.
fn top_savings(products: &[UnifiedProduct]) -> Vec<SavingsOpportunity> {
    let mut candidates: Vec<(&UnifiedProduct, &SavingsAnalysis)> = products
        .iter()
        .filter(|p| p.is_cross_network)
        .filter_map(|p| p.savings_analysis.as_ref().map(|s| (p, s)))
        .filter(|(_, s)| s.absolute_savings > 0.0)
        .collect();
    candidates.sort_by(|a, b| b.1.absolute_savings.total_cmp(&a.1.absolute_savings));

    candidates
        .into_iter()
        .take(TOP_SAVINGS_LIMIT)
        .map(|(product, savings)| SavingsOpportunity {
            product_id: product.id.clone(),
            name: product.canonical_name.clone(),
            savings_amount: savings.absolute_savings,
            savings_percentage: savings.percent_savings,
            cheapest_network: savings.cheapest_network.clone(),
            most_expensive_network: savings.most_expensive_network.clone(),
            networks_count: product.network_count(),
        })
        .collect()
}

fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
