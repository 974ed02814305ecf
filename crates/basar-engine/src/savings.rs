//! Cross-network price spread for a single product.

use basar_core::{PriceTable, SavingsAnalysis};

/// Analyses a price table. `None` when fewer than two networks offer the
/// product.
///
/// Cheapest and most expensive networks are the first to reach the extreme
/// in table order. Values are not rounded.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn analyze_savings(table: &PriceTable, significant_percent: f64) -> Option<SavingsAnalysis> {
    if table.len() < 2 {
        return None;
    }

    let mut entries = table.iter();
    let (first_network, first) = entries.next()?;
    let mut cheapest = (first_network, first.price);
    let mut priciest = (first_network, first.price);
    let mut sum = first.price;

    for (network, entry) in entries {
        if entry.price < cheapest.1 {
            cheapest = (network, entry.price);
        }
        if entry.price > priciest.1 {
            priciest = (network, entry.price);
        }
        sum += entry.price;
    }

    let min_price = cheapest.1;
    let max_price = priciest.1;
    let avg_price = sum / table.len() as f64;
    let absolute_savings = max_price - min_price;
    let percent_savings = if max_price > 0.0 {
        absolute_savings / max_price * 100.0
    } else {
        0.0
    };
    let volatility_percent = if avg_price > 0.0 {
        absolute_savings / avg_price * 100.0
    } else {
        0.0
    };

    Some(SavingsAnalysis {
        min_price,
        max_price,
        avg_price,
        absolute_savings,
        percent_savings,
        cheapest_network: cheapest.0.clone(),
        most_expensive_network: priciest.0.clone(),
        volatility_percent,
        significant_savings: percent_savings >= significant_percent,
    })
}

#[cfg(test)]
mod tests {
    use basar_core::{NetworkId, PriceEntry};

    use super::*;

    fn table(entries: &[(&str, f64)]) -> PriceTable {
        entries
            .iter()
            .map(|(network, price)| {
                (
                    NetworkId::new(network),
                    PriceEntry {
                        network: NetworkId::new(network),
                        price: *price,
                        unit: "kg".to_string(),
                        quality_score: 50.0,
                        source: "test".to_string(),
                        product_id: None,
                    },
                )
            })
            .collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn single_entry_has_no_analysis() {
        assert!(analyze_savings(&table(&[("victory", 89.9)]), 15.0).is_none());
        assert!(analyze_savings(&PriceTable::new(), 15.0).is_none());
    }

    #[test]
    fn two_network_spread() {
        let s = analyze_savings(&table(&[("victory", 89.9), ("rami_levy", 79.9)]), 15.0).unwrap();
        assert!(close(s.min_price, 79.9));
        assert!(close(s.max_price, 89.9));
        assert!(close(s.avg_price, 84.9));
        assert!(close(s.absolute_savings, 10.0));
        assert!(close(s.percent_savings, 10.0 / 89.9 * 100.0));
        assert!(close(s.volatility_percent, 10.0 / 84.9 * 100.0));
        assert_eq!(s.cheapest_network.as_str(), "rami_levy");
        assert_eq!(s.most_expensive_network.as_str(), "victory");
        assert!(!s.significant_savings);
    }

    #[test]
    fn significant_savings_at_threshold() {
        let s = analyze_savings(&table(&[("a", 75.0), ("b", 100.0)]), 25.0).unwrap();
        assert!(close(s.percent_savings, 25.0));
        assert!(s.significant_savings);
    }

    #[test]
    fn ties_go_to_first_in_table_order() {
        let s = analyze_savings(
            &table(&[("mega", 10.0), ("victory", 10.0), ("shufersal", 20.0), ("osher_ad", 20.0)]),
            15.0,
        )
        .unwrap();
        assert_eq!(s.cheapest_network.as_str(), "mega");
        assert_eq!(s.most_expensive_network.as_str(), "shufersal");
    }

    #[test]
    fn equal_prices_give_zero_savings() {
        let s = analyze_savings(&table(&[("a", 30.0), ("b", 30.0)]), 15.0).unwrap();
        assert!(close(s.absolute_savings, 0.0));
        assert!(close(s.percent_savings, 0.0));
        assert_eq!(s.cheapest_network, s.most_expensive_network);
    }

    #[test]
    fn zero_prices_do_not_divide_by_zero() {
        let s = analyze_savings(&table(&[("a", 0.0), ("b", 0.0)]), 15.0).unwrap();
        assert!(close(s.percent_savings, 0.0));
        assert!(close(s.volatility_percent, 0.0));
    }
}
