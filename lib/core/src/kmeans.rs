//! Seeded k-means (Lloyd's algorithm with k-means++ seeding).
//!
//! Each iteration is a map-reduce: vectors are split into fixed-size chunks,
//! every chunk produces partial per-cluster sums and counts in parallel, and
//! the partials are combined sequentially in chunk order. Because the chunk
//! boundaries never depend on the number of worker threads, the floating
//! point summation order is fixed and a given `(data, k, seed)` always yields
//! bit-identical centroids.

use crate::config::{EngineConfig, ModelConfig};
use crate::model::{nearest, ClusterAssignment, ClusterModel};
use crate::vector::{FeatureVector, LabeledVector};
use crate::{Error, Result};
use ahash::AHashSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

pub const DEFAULT_MAX_ITERATIONS: usize = 20;
pub const DEFAULT_TOLERANCE: f64 = 1e-4;
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// k-means trainer configuration.
#[derive(Debug, Clone)]
pub struct KMeans {
    k: usize,
    seed: u64,
    max_iter: usize,
    /// Stop once no centroid moves further than this (Euclidean).
    tol: f64,
    chunk_size: usize,
}

/// Output of [`KMeans::fit`].
#[derive(Debug, Clone)]
pub struct KMeansFit {
    pub model: ClusterModel,
    pub assignments: Vec<ClusterAssignment>,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            seed: 0,
            max_iter: DEFAULT_MAX_ITERATIONS,
            tol: DEFAULT_TOLERANCE,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn from_config(model: &ModelConfig, engine: &EngineConfig) -> Self {
        Self::new(model.k)
            .with_seed(model.seed)
            .with_max_iter(model.max_iterations)
            .with_tol(model.tolerance)
            .with_chunk_size(engine.chunk_size)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Fit on labeled vectors and return one assignment per input, in input order.
    pub fn fit(&self, data: &[LabeledVector]) -> Result<KMeansFit> {
        let vectors: Vec<FeatureVector> = data.iter().map(|v| v.features).collect();
        let (model, labels) = self.fit_vectors(&vectors)?;

        let assignments = data
            .iter()
            .zip(labels)
            .map(|(v, cluster)| ClusterAssignment {
                code: v.code.clone(),
                cluster,
            })
            .collect();

        Ok(KMeansFit { model, assignments })
    }

    /// Fit on bare vectors, returning the model and the label of each vector.
    pub fn fit_vectors(&self, vectors: &[FeatureVector]) -> Result<(ClusterModel, Vec<usize>)> {
        if self.k == 0 {
            return Err(Error::InvalidConfig("k must be a positive integer".into()));
        }

        let distinct = distinct_vectors(vectors);
        if distinct.len() < self.k {
            return Err(Error::InsufficientData {
                required: self.k,
                found: distinct.len(),
            });
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centroids = self.init_centroids(&distinct, &mut rng)?;
        let (mut labels, mut cost) = assign(vectors, &centroids);
        let mut iterations = 0;

        while iterations < self.max_iter {
            iterations += 1;

            let updated = self.update_centroids(vectors, &labels, &centroids);
            let shift = centroids
                .iter()
                .zip(updated.iter())
                .map(|(old, new)| old.distance(new))
                .fold(0.0, f64::max);
            centroids = updated;

            let (new_labels, new_cost) = assign(vectors, &centroids);
            let stable = new_labels == labels;
            labels = new_labels;
            cost = new_cost;

            debug!(
                "k-means iteration {}: max centroid shift {:.6}, cost {:.4}",
                iterations, shift, cost
            );

            if stable || shift <= self.tol {
                break;
            }
        }

        Ok((ClusterModel::new(self.seed, centroids, iterations, cost), labels))
    }

    /// k-means++ over distinct vectors; the k seeds are therefore distinct.
    ///
    /// Fails when fewer than k vectors lie at a non-zero distance from each
    /// other, which bitwise distinctness alone does not guarantee.
    fn init_centroids(
        &self,
        distinct: &[FeatureVector],
        rng: &mut StdRng,
    ) -> Result<Vec<FeatureVector>> {
        let n = distinct.len();
        let mut centroids = Vec::with_capacity(self.k);
        centroids.push(distinct[rng.random_range(0..n)]);

        let mut min_dist: Vec<f64> = distinct
            .par_iter()
            .map(|v| v.squared_distance(&centroids[0]))
            .collect();

        while centroids.len() < self.k {
            let total: f64 = min_dist.iter().sum();
            let threshold = rng.random::<f64>() * total;

            let mut cumsum = 0.0;
            let mut selected = None;
            for (j, &d) in min_dist.iter().enumerate() {
                if d <= 0.0 {
                    continue;
                }
                cumsum += d;
                selected = Some(j);
                if cumsum >= threshold {
                    break;
                }
            }

            let Some(selected) = selected else {
                return Err(Error::InsufficientData {
                    required: self.k,
                    found: centroids.len(),
                });
            };
            let chosen = distinct[selected];
            centroids.push(chosen);

            min_dist
                .par_iter_mut()
                .zip(distinct.par_iter())
                .for_each(|(d, v)| *d = d.min(v.squared_distance(&chosen)));
        }

        Ok(centroids)
    }

    fn update_centroids(
        &self,
        vectors: &[FeatureVector],
        labels: &[usize],
        previous: &[FeatureVector],
    ) -> Vec<FeatureVector> {
        let k = previous.len();

        let partials: Vec<(Vec<FeatureVector>, Vec<usize>)> = vectors
            .par_chunks(self.chunk_size)
            .zip(labels.par_chunks(self.chunk_size))
            .map(|(vs, ls)| {
                let mut sums = vec![FeatureVector::zeros(); k];
                let mut counts = vec![0usize; k];
                for (v, &l) in vs.iter().zip(ls) {
                    sums[l].add_assign(v);
                    counts[l] += 1;
                }
                (sums, counts)
            })
            .collect();

        let mut sums = vec![FeatureVector::zeros(); k];
        let mut counts = vec![0usize; k];
        for (partial_sums, partial_counts) in &partials {
            for c in 0..k {
                sums[c].add_assign(&partial_sums[c]);
                counts[c] += partial_counts[c];
            }
        }

        sums.iter()
            .zip(counts)
            .zip(previous)
            .map(|((sum, count), prev)| {
                if count > 0 {
                    sum * (1.0 / count as f64)
                } else {
                    // empty cluster keeps its centroid
                    *prev
                }
            })
            .collect()
    }
}

/// Nearest-centroid labels plus the total squared distance.
fn assign(vectors: &[FeatureVector], centroids: &[FeatureVector]) -> (Vec<usize>, f64) {
    let scored: Vec<(usize, f64)> = vectors.par_iter().map(|v| nearest(centroids, v)).collect();
    let cost: f64 = scored.iter().map(|(_, d)| d).sum();
    (scored.into_iter().map(|(l, _)| l).collect(), cost)
}

/// Distinct vectors in first-occurrence order.
fn distinct_vectors(vectors: &[FeatureVector]) -> Vec<FeatureVector> {
    let mut seen = AHashSet::with_capacity(vectors.len());
    vectors
        .iter()
        .filter(|v| seen.insert(v.bit_key()))
        .copied()
        .collect()
}
