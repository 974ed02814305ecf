//! Per-source duplicate suppression.
//!
//! A single feed often lists one product several times (per branch, per
//! pack size). Before cross-network linking, records from the same source
//! and the same network whose keys reach the duplicate threshold collapse to
//! one survivor: highest quality first, then the lower price, then the
//! record seen first. Records from different sources or networks are never
//! compared here.

use std::collections::HashMap;

use basar_core::NetworkId;

use crate::error::EngineError;
use crate::linker::{best_match, validate_threshold};
use crate::normalize::NormalizedKey;
use crate::record::PreparedRecord;

#[derive(Debug, Clone)]
pub struct DuplicateFilter {
    threshold: f64,
    min_key_length: usize,
}

/// A duplicate group inside one `(source, network)` bucket.
struct Group {
    representative: NormalizedKey,
    /// Position of the current survivor in the output.
    slot: usize,
}

impl DuplicateFilter {
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSetting`] if `threshold` is outside
    /// `[0, 1]`.
    pub fn new(threshold: f64, min_key_length: usize) -> Result<Self, EngineError> {
        validate_threshold("duplicate_threshold", threshold)?;
        Ok(Self {
            threshold,
            min_key_length,
        })
    }

    /// Returns the surviving records in input order and the number removed.
    ///
    /// A survivor takes the position of the first record of its group.
    /// Unmatchable records pass through untouched.
    #[must_use]
    pub fn apply(&self, records: Vec<PreparedRecord>) -> (Vec<PreparedRecord>, usize) {
        let mut kept: Vec<PreparedRecord> = Vec::with_capacity(records.len());
        let mut buckets: HashMap<(usize, NetworkId), Vec<Group>> = HashMap::new();
        let mut suppressed = 0usize;

        for record in records {
            if !record.key.is_matchable(self.min_key_length) {
                kept.push(record);
                continue;
            }

            let groups = buckets
                .entry((record.source_index, record.network.clone()))
                .or_default();
            let hit = best_match(
                groups.iter().map(|g| &g.representative),
                &record.key,
                self.threshold,
            );

            match hit {
                Some((pos, similarity)) => {
                    let slot = groups[pos].slot;
                    suppressed += 1;
                    tracing::trace!(
                        kept = %kept[slot].key,
                        duplicate = %record.key,
                        similarity,
                        "duplicate within source"
                    );
                    if record.outranks(&kept[slot]) {
                        kept[slot] = record;
                    }
                }
                None => {
                    groups.push(Group {
                        representative: record.key.clone(),
                        slot: kept.len(),
                    });
                    kept.push(record);
                }
            }
        }

        (kept, suppressed)
    }
}
