//! Greedy online record linking.
//!
//! Keys are processed once, in input order. Each key is compared with the
//! representative key of every existing cluster (never with other members)
//! and joins the most similar one if that similarity reaches the threshold.
//! Ties go to the cluster created first. A key matching no cluster becomes
//! the representative of a new one.
//!
//! The result depends on input order: a different order can yield different
//! clusters. Callers control determinism by feeding sources in a fixed order.

use crate::error::EngineError;
use crate::normalize::NormalizedKey;
use crate::similarity::ratio;

/// One member of a [`ProductCluster`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterMember {
    /// Index of the record in the slice handed to [`RecordLinker::link`].
    pub index: usize,
    /// Similarity to the cluster's representative key.
    pub similarity: f64,
}

/// Records believed to describe the same physical product.
#[derive(Debug, Clone)]
pub struct ProductCluster {
    pub representative: NormalizedKey,
    /// Members in input order. The first is the representative's own record.
    pub members: Vec<ClusterMember>,
}

impl ProductCluster {
    pub fn member_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().map(|m| m.index)
    }
}

/// Output of a linking pass.
#[derive(Debug, Clone, Default)]
pub struct Linkage {
    /// Clusters in creation order.
    pub clusters: Vec<ProductCluster>,
    /// Records whose key was too short to match.
    pub unmatchable: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct RecordLinker {
    threshold: f64,
    min_key_length: usize,
}

impl RecordLinker {
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSetting`] if `threshold` is outside
    /// `[0, 1]`.
    pub fn new(threshold: f64, min_key_length: usize) -> Result<Self, EngineError> {
        validate_threshold("cluster_threshold", threshold)?;
        Ok(Self {
            threshold,
            min_key_length,
        })
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn link<'a, I>(&self, keys: I) -> Linkage
    where
        I: IntoIterator<Item = &'a NormalizedKey>,
    {
        let mut linkage = Linkage::default();

        for (index, key) in keys.into_iter().enumerate() {
            if !key.is_matchable(self.min_key_length) {
                linkage.unmatchable.push(index);
                continue;
            }

            let representatives = linkage.clusters.iter().map(|c| &c.representative);
            match best_match(representatives, key, self.threshold) {
                Some((pos, similarity)) => {
                    linkage.clusters[pos]
                        .members
                        .push(ClusterMember { index, similarity });
                }
                None => linkage.clusters.push(ProductCluster {
                    representative: key.clone(),
                    members: vec![ClusterMember {
                        index,
                        similarity: 1.0,
                    }],
                }),
            }
        }

        tracing::debug!(
            clusters = linkage.clusters.len(),
            unmatchable = linkage.unmatchable.len(),
            threshold = self.threshold,
            "linking complete"
        );
        linkage
    }
}

/// Position and similarity of the most similar candidate scoring at least
/// `threshold`. The earliest candidate wins ties.
pub(crate) fn best_match<'a, I>(candidates: I, key: &NormalizedKey, threshold: f64) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = &'a NormalizedKey>,
{
    let mut best: Option<(usize, f64)> = None;
    for (pos, candidate) in candidates.into_iter().enumerate() {
        let similarity = ratio(key.as_str(), candidate.as_str());
        if similarity < threshold {
            continue;
        }
        if best.is_none_or(|(_, top)| similarity > top) {
            best = Some((pos, similarity));
        }
    }
    best
}

pub(crate) fn validate_threshold(setting: &str, value: f64) -> Result<(), EngineError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::InvalidSetting {
            setting: setting.to_string(),
            reason: format!("must be within [0, 1], got {value}"),
        })
    }
}
