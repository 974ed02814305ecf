//! Unification pipeline orchestration.

use basar_core::{AppConfig, Catalog, Knowledge, RawProductRecord};
use chrono::Utc;

use crate::catalog::assemble_catalog;
use crate::category::CategoryResolver;
use crate::dedupe::DuplicateFilter;
use crate::error::EngineError;
use crate::input::{parse_source, SourceBatch};
use crate::linker::RecordLinker;
use crate::network::NetworkResolver;
use crate::normalize::NameNormalizer;
use crate::price::{PriceBounds, PriceExtractor};
use crate::quality::record_quality;
use crate::record::PreparedRecord;
use crate::unified::UnifiedProductBuilder;

/// Tunable engine parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub cluster_threshold: f64,
    pub duplicate_threshold: f64,
    pub suppress_duplicates: bool,
    pub min_key_length: usize,
    pub min_price: f64,
    pub max_price: f64,
    pub significant_savings_percent: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for EngineSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            cluster_threshold: config.cluster_threshold,
            duplicate_threshold: config.duplicate_threshold,
            suppress_duplicates: config.suppress_duplicates,
            min_key_length: config.min_key_length,
            min_price: config.min_price,
            max_price: config.max_price,
            significant_savings_percent: config.significant_savings_percent,
        }
    }
}

/// A source document handed to the engine by the caller.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub name: String,
    pub content: String,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Counters for one unification run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub sources_read: usize,
    pub sources_skipped: usize,
    pub records_ingested: usize,
    /// Objects in a product list that could not be read as a record.
    pub records_rejected: usize,
    /// Records whose normalized name was too short to match.
    pub records_unmatchable: usize,
    pub duplicates_suppressed: usize,
    pub clusters_formed: usize,
    /// Clusters without a single priced offer.
    pub clusters_dropped: usize,
    pub products_emitted: usize,
}

/// Result of a run that had at least one usable source.
#[derive(Debug, Clone)]
pub enum UnifyOutcome {
    Catalog { catalog: Catalog, stats: RunStats },
    /// The run succeeded but produced no products.
    Empty { stats: RunStats },
}

impl UnifyOutcome {
    #[must_use]
    pub fn stats(&self) -> &RunStats {
        match self {
            UnifyOutcome::Catalog { stats, .. } | UnifyOutcome::Empty { stats } => stats,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Option<&Catalog> {
        match self {
            UnifyOutcome::Catalog { catalog, .. } => Some(catalog),
            UnifyOutcome::Empty { .. } => None,
        }
    }

    #[must_use]
    pub fn into_catalog(self) -> Option<Catalog> {
        match self {
            UnifyOutcome::Catalog { catalog, .. } => Some(catalog),
            UnifyOutcome::Empty { .. } => None,
        }
    }
}

/// The unification engine. Holds immutable components built once from the
/// knowledge tables and settings; a run never mutates it.
#[derive(Debug, Clone)]
pub struct Engine {
    normalizer: NameNormalizer,
    prices: PriceExtractor,
    networks: NetworkResolver,
    duplicates: Option<DuplicateFilter>,
    linker: RecordLinker,
    builder: UnifiedProductBuilder,
}

impl Engine {
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSetting`] if a threshold lies outside
    /// `[0, 1]` or the price bounds are not a finite `min < max` pair.
    pub fn new(knowledge: &Knowledge, settings: &EngineSettings) -> Result<Self, EngineError> {
        let bounds = PriceBounds::new(settings.min_price, settings.max_price)?;
        let linker = RecordLinker::new(settings.cluster_threshold, settings.min_key_length)?;
        let duplicates = if settings.suppress_duplicates {
            Some(DuplicateFilter::new(
                settings.duplicate_threshold,
                settings.min_key_length,
            )?)
        } else {
            None
        };

        Ok(Self {
            normalizer: NameNormalizer::from_knowledge(knowledge),
            prices: PriceExtractor::new(bounds),
            networks: NetworkResolver::from_knowledge(knowledge),
            duplicates,
            linker,
            builder: UnifiedProductBuilder::new(
                CategoryResolver::from_knowledge(knowledge),
                settings.significant_savings_percent,
            ),
        })
    }

    #[must_use]
    pub fn normalizer(&self) -> &NameNormalizer {
        &self.normalizer
    }

    /// Derives key, price, network and quality for one record.
    #[must_use]
    pub fn prepare(&self, source_index: usize, record: RawProductRecord) -> PreparedRecord {
        let key = self.normalizer.normalize(&record.name);
        let price = self.prices.extract(&record);
        let network = self.networks.resolve(&record);
        let quality = record_quality(&record, price.is_some());
        PreparedRecord {
            record,
            source_index,
            key,
            price,
            network,
            quality,
        }
    }

    /// Parses and unifies raw source documents.
    ///
    /// A document that fails to parse is logged and skipped; the remaining
    /// documents are still processed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoUsableSources`] if no document could be read.
    pub fn unify_documents(&self, documents: &[SourceDocument]) -> Result<UnifyOutcome, EngineError> {
        let mut batches = Vec::with_capacity(documents.len());
        let mut skipped = 0usize;

        for doc in documents {
            match parse_source(&doc.name, &doc.content) {
                Ok(batch) => batches.push(batch),
                Err(e) => {
                    tracing::warn!(source = %doc.name, error = %e, "skipping unusable source");
                    skipped += 1;
                }
            }
        }

        if batches.is_empty() {
            return Err(EngineError::NoUsableSources {
                attempted: documents.len(),
            });
        }

        let mut outcome = self.unify(batches);
        match &mut outcome {
            UnifyOutcome::Catalog { stats, .. } | UnifyOutcome::Empty { stats } => {
                stats.sources_skipped = skipped;
            }
        }
        Ok(outcome)
    }

    /// Unifies already-parsed batches. Clustering follows batch order, then
    /// record order within each batch.
    #[must_use]
    pub fn unify(&self, batches: Vec<SourceBatch>) -> UnifyOutcome {
        let mut stats = RunStats {
            sources_read: batches.len(),
            ..RunStats::default()
        };

        // Step 1: derive key, price, network and quality for every record.
        let mut records = Vec::new();
        for (source_index, batch) in batches.into_iter().enumerate() {
            stats.records_rejected += batch.rejected;
            records.extend(
                batch
                    .records
                    .into_iter()
                    .map(|record| self.prepare(source_index, record)),
            );
        }
        stats.records_ingested = records.len();

        // Step 2: collapse duplicate listings within each source.
        if let Some(filter) = &self.duplicates {
            let (kept, suppressed) = filter.apply(records);
            records = kept;
            stats.duplicates_suppressed = suppressed;
        }

        // Step 3: link records across sources.
        let linkage = self.linker.link(records.iter().map(|r| &r.key));
        stats.records_unmatchable = linkage.unmatchable.len();
        stats.clusters_formed = linkage.clusters.len();

        // Step 4: build one product per cluster with at least one offer.
        let products: Vec<_> = linkage
            .clusters
            .iter()
            .filter_map(|cluster| self.builder.build(cluster, &records))
            .collect();
        stats.clusters_dropped = stats.clusters_formed - products.len();
        stats.products_emitted = products.len();

        tracing::info!(
            sources = stats.sources_read,
            records = stats.records_ingested,
            unmatchable = stats.records_unmatchable,
            duplicates = stats.duplicates_suppressed,
            clusters = stats.clusters_formed,
            dropped = stats.clusters_dropped,
            products = stats.products_emitted,
            "unification complete"
        );

        if products.is_empty() {
            tracing::warn!("no unified products produced");
            return UnifyOutcome::Empty { stats };
        }

        let catalog = assemble_catalog(products, Utc::now());
        UnifyOutcome::Catalog { catalog, stats }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn engine() -> Engine {
        Engine::new(&Knowledge::bundled().unwrap(), &EngineSettings::default()).unwrap()
    }

    #[test]
    fn settings_follow_app_config() {
        let config = AppConfig {
            cluster_threshold: 0.9,
            suppress_duplicates: false,
            ..AppConfig::default()
        };
        let settings = EngineSettings::from(&config);
        assert!((settings.cluster_threshold - 0.9).abs() < f64::EPSILON);
        assert!(!settings.suppress_duplicates);
        assert_eq!(settings.min_key_length, 5);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let knowledge = Knowledge::bundled().unwrap();
        let bad_threshold = EngineSettings {
            cluster_threshold: 2.0,
            ..EngineSettings::default()
        };
        assert!(matches!(
            Engine::new(&knowledge, &bad_threshold),
            Err(EngineError::InvalidSetting { .. })
        ));
        let bad_bounds = EngineSettings {
            min_price: 10.0,
            max_price: 1.0,
            ..EngineSettings::default()
        };
        assert!(Engine::new(&knowledge, &bad_bounds).is_err());
    }

    #[test]
    fn prepare_derives_every_field() {
        let record: RawProductRecord = serde_json::from_value(json!({
            "name": "אנטריקוט בקר טרי 1 ק\"ג",
            "price": "89.90 ₪",
            "source": "ויקטורי"
        }))
        .unwrap();
        let prepared = engine().prepare(3, record);
        assert_eq!(prepared.key.as_str(), "אנטריקוט בקר");
        assert_eq!(prepared.price, Some(89.9));
        assert_eq!(prepared.network.as_str(), "victory");
        assert!((prepared.quality - 50.0).abs() < f64::EPSILON);
        assert_eq!(prepared.source_index, 3);
    }

    #[test]
    fn duplicate_suppression_can_be_disabled() {
        let docs = [SourceDocument::new(
            "victory.json",
            json!([
                {"name": "חזה עוף", "price": 30, "network": "victory"},
                {"name": "חזה עוף", "price": 28, "network": "victory"}
            ])
            .to_string(),
        )];
        let knowledge = Knowledge::bundled().unwrap();

        let on = engine().unify_documents(&docs).unwrap();
        assert_eq!(on.stats().duplicates_suppressed, 1);

        let off_settings = EngineSettings {
            suppress_duplicates: false,
            ..EngineSettings::default()
        };
        let off = Engine::new(&knowledge, &off_settings)
            .unwrap()
            .unify_documents(&docs)
            .unwrap();
        assert_eq!(off.stats().duplicates_suppressed, 0);
        // Both variants still yield one product priced at the lower offer.
        let catalog = off.catalog().unwrap();
        assert_eq!(catalog.products.len(), 1);
        assert!((catalog.products[0].price_table[0].price - 28.0).abs() < f64::EPSILON);
    }
}
