use crate::record::FeatureColumn;
use crate::vector::{FeatureVector, LabeledVector};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Cluster index for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub code: String,
    pub cluster: usize,
}

/// A fitted k-means model. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterModel {
    k: usize,
    seed: u64,
    feature_columns: Vec<String>,
    centroids: Vec<FeatureVector>,
    iterations: usize,
    /// Sum of squared distances from each point to its centroid.
    cost: f64,
}

impl ClusterModel {
    pub(crate) fn new(seed: u64, centroids: Vec<FeatureVector>, iterations: usize, cost: f64) -> Self {
        Self {
            k: centroids.len(),
            seed,
            feature_columns: FeatureColumn::names(),
            centroids,
            iterations,
            cost,
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    pub fn centroids(&self) -> &[FeatureVector] {
        &self.centroids
    }

    pub fn dim(&self) -> usize {
        self.centroids.first().map(|c| c.dim()).unwrap_or(0)
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Check a model that came from outside the trainer, e.g. a saved artifact.
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 || self.centroids.len() != self.k {
            return Err(Error::Persistence(format!(
                "model declares k = {} but carries {} centroids",
                self.k,
                self.centroids.len()
            )));
        }
        if self.feature_columns != FeatureColumn::names() {
            return Err(Error::Persistence(format!(
                "unexpected feature columns {:?}",
                self.feature_columns
            )));
        }
        if self.centroids.iter().flat_map(|c| c.as_slice()).any(|x| !x.is_finite()) {
            return Err(Error::Persistence("model has non-finite centroid values".into()));
        }
        Ok(())
    }

    /// Index of the nearest centroid. Ties go to the lowest index.
    pub fn predict(&self, vector: &FeatureVector) -> usize {
        nearest(&self.centroids, vector).0
    }

    /// Re-attach cluster indices to record codes.
    pub fn assign(&self, vectors: &[LabeledVector]) -> Vec<ClusterAssignment> {
        vectors
            .iter()
            .map(|v| ClusterAssignment {
                code: v.code.clone(),
                cluster: self.predict(&v.features),
            })
            .collect()
    }
}

/// Nearest centroid and its squared distance.
pub(crate) fn nearest(centroids: &[FeatureVector], vector: &FeatureVector) -> (usize, f64) {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let dist = vector.squared_distance(centroid);
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    (best, best_dist)
}
