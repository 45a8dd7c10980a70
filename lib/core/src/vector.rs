use crate::record::FEATURE_DIM;
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// A fixed-order nutrient vector: energy, fat, carbohydrates, sugars,
/// proteins, salt, sodium.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct FeatureVector([f64; FEATURE_DIM]);

impl FeatureVector {
    #[inline]
    #[must_use]
    pub fn new(data: [f64; FEATURE_DIM]) -> Self {
        Self(data)
    }

    #[inline]
    #[must_use]
    pub fn zeros() -> Self {
        Self([0.0; FEATURE_DIM])
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        FEATURE_DIM
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[inline]
    pub fn as_array(&self) -> &[f64; FEATURE_DIM] {
        &self.0
    }

    #[inline]
    pub fn dot(&self, other: &FeatureVector) -> f64 {
        self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum()
    }

    #[inline]
    pub fn squared_norm(&self) -> f64 {
        self.dot(self)
    }

    #[inline]
    pub fn squared_distance(&self, other: &FeatureVector) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    /// Euclidean distance
    #[inline]
    pub fn distance(&self, other: &FeatureVector) -> f64 {
        self.squared_distance(other).sqrt()
    }

    /// Bit pattern used to detect duplicate vectors. `-0.0` and `0.0` compare equal.
    pub fn bit_key(&self) -> [u64; FEATURE_DIM] {
        let mut key = [0u64; FEATURE_DIM];
        for (k, v) in key.iter_mut().zip(self.0.iter()) {
            *k = (v + 0.0).to_bits();
        }
        key
    }

    #[inline]
    pub fn add_assign(&mut self, other: &FeatureVector) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a += b;
        }
    }
}

impl From<[f64; FEATURE_DIM]> for FeatureVector {
    fn from(data: [f64; FEATURE_DIM]) -> Self {
        Self(data)
    }
}

impl Mul<f64> for &FeatureVector {
    type Output = FeatureVector;

    fn mul(self, scalar: f64) -> FeatureVector {
        let mut out = *self;
        for x in &mut out.0 {
            *x *= scalar;
        }
        out
    }
}

/// A feature vector carried with the code of the record it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledVector {
    pub code: String,
    pub features: FeatureVector,
}

impl LabeledVector {
    pub fn new(code: impl Into<String>, features: FeatureVector) -> Self {
        Self {
            code: code.into(),
            features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_distance() {
        let a = FeatureVector::new([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let b = FeatureVector::new([3.0, 4.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!((a.squared_distance(&b) - 25.0).abs() < 1e-12);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_bit_key_treats_signed_zero_as_equal() {
        let a = FeatureVector::new([-0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = FeatureVector::new([0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(a.bit_key(), b.bit_key());
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let v = FeatureVector::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "[1.0,2.0,3.0,4.0,5.0,6.0,7.0]");
    }
}
