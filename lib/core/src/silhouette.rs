//! Mean silhouette coefficient with squared Euclidean dissimilarity.
//!
//! For a point `x` in cluster `A`:
//!
//! ```text
//! a(x) = mean d(x, y) over y ∈ A, y ≠ x
//! b(x) = min over C ≠ A of mean d(x, y) over y ∈ C
//! s(x) = (b - a) / max(a, b)
//! ```
//!
//! With `d` the squared Euclidean distance, the mean distance from `x` to all
//! members of `C` expands to `‖x‖² + Σ‖y‖²/n - 2·x·Σy/n`, so each cluster is
//! summarized by its size, vector sum and sum of squared norms, and the score
//! costs O(n·k·d) instead of O(n²·d).

use crate::model::ClusterAssignment;
use crate::vector::{FeatureVector, LabeledVector};
use crate::{Error, Result};
use rayon::prelude::*;

#[derive(Debug, Clone)]
struct ClusterStats {
    count: usize,
    sum: FeatureVector,
    squared_norm_sum: f64,
}

impl ClusterStats {
    fn empty() -> Self {
        Self {
            count: 0,
            sum: FeatureVector::zeros(),
            squared_norm_sum: 0.0,
        }
    }

    /// Mean squared distance from `x` to every member, `x` included if it is one.
    fn mean_distance(&self, x: &FeatureVector, x_norm: f64) -> f64 {
        let n = self.count as f64;
        (x_norm + self.squared_norm_sum / n - 2.0 * x.dot(&self.sum) / n).max(0.0)
    }
}

/// Score labeled vectors against their assignments (matched by position).
pub fn evaluate(vectors: &[LabeledVector], assignments: &[ClusterAssignment]) -> Result<f64> {
    let features: Vec<FeatureVector> = vectors.iter().map(|v| v.features).collect();
    let labels: Vec<usize> = assignments.iter().map(|a| a.cluster).collect();
    silhouette_score(&features, &labels)
}

/// Mean silhouette over all points, in `[-1, 1]`.
///
/// Every non-empty cluster must have at least two members and at least two
/// clusters must be non-empty; cluster indices with no members are ignored.
pub fn silhouette_score(vectors: &[FeatureVector], labels: &[usize]) -> Result<f64> {
    if vectors.len() != labels.len() {
        return Err(Error::LengthMismatch {
            vectors: vectors.len(),
            assignments: labels.len(),
        });
    }

    // a partition of n points never needs a label >= n
    if let Some(&label) = labels.iter().find(|&&l| l >= vectors.len()) {
        return Err(Error::LabelOutOfRange {
            label,
            points: vectors.len(),
        });
    }

    let n_clusters = labels.iter().max().map(|&m| m + 1).unwrap_or(0);
    let mut stats = vec![ClusterStats::empty(); n_clusters];
    for (v, &l) in vectors.iter().zip(labels) {
        let s = &mut stats[l];
        s.count += 1;
        s.sum.add_assign(v);
        s.squared_norm_sum += v.squared_norm();
    }

    let occupied: Vec<usize> = (0..n_clusters).filter(|&c| stats[c].count > 0).collect();
    if occupied.len() < 2 {
        return Err(Error::TooFewClusters {
            found: occupied.len(),
        });
    }
    if let Some(&c) = occupied.iter().find(|&&c| stats[c].count < 2) {
        return Err(Error::UndersizedCluster {
            cluster: c,
            size: stats[c].count,
        });
    }

    let total: f64 = vectors
        .par_iter()
        .zip(labels.par_iter())
        .map(|(x, &own)| {
            let x_norm = x.squared_norm();
            let own_stats = &stats[own];
            let n_own = own_stats.count as f64;
            let a = own_stats.mean_distance(x, x_norm) * n_own / (n_own - 1.0);
            let b = occupied
                .iter()
                .filter(|&&c| c != own)
                .map(|&c| stats[c].mean_distance(x, x_norm))
                .fold(f64::INFINITY, f64::min);
            point_silhouette(a, b)
        })
        .collect::<Vec<f64>>()
        .iter()
        .sum();

    Ok((total / vectors.len() as f64).clamp(-1.0, 1.0))
}

#[inline]
fn point_silhouette(a: f64, b: f64) -> f64 {
    let denom = a.max(b);
    if denom > 0.0 {
        (b - a) / denom
    } else {
        0.0
    }
}
