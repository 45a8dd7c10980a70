//! # nutriclust Core
//!
//! Core library for the nutriclust pipeline.
//!
//! This crate provides the clustering stages, in the order the pipeline runs them:
//!
//! - [`FeatureFilter`] - Drops records with physically impossible nutrient values
//! - [`FeatureAssembler`] - Packs the seven nutrient columns into a [`FeatureVector`]
//! - [`KMeans`] - Seeded, deterministic k-means producing a [`ClusterModel`]
//! - [`silhouette`] - Mean silhouette score of the resulting partition
//!
//! ## Example
//!
//! ```rust
//! use nutriclust_core::{FeatureAssembler, FeatureFilter, KMeans, Row, Table};
//!
//! let row = |code: &str, energy: f64| {
//!     Row::new()
//!         .with("code", code)
//!         .with("energy_kcal_100g", energy)
//!         .with("fat_100g", 1.0)
//!         .with("carbohydrates_100g", 1.0)
//!         .with("sugars_100g", 1.0)
//!         .with("proteins_100g", 1.0)
//!         .with("salt_100g", 0.1)
//!         .with("sodium_100g", 0.04)
//! };
//! let table = Table::with_feature_schema("foods").with_rows(vec![
//!     row("a", 10.0),
//!     row("b", 12.0),
//!     row("c", 400.0),
//!     row("d", 410.0),
//!     row("e", 1500.0),
//! ]);
//!
//! let kept = FeatureFilter::new().apply(&table).unwrap();
//! assert_eq!(kept.len(), 4);
//!
//! let vectors = FeatureAssembler::new().assemble(&kept).unwrap();
//! let fit = KMeans::new(2).with_seed(42).fit(&vectors).unwrap();
//! let score = nutriclust_core::silhouette::evaluate(&vectors, &fit.assignments).unwrap();
//! assert!(score > 0.5);
//! ```

pub mod assembler;
pub mod config;
pub mod error;
pub mod filter;
pub mod kmeans;
pub mod model;
pub mod record;
pub mod silhouette;
pub mod vector;

pub use assembler::FeatureAssembler;
pub use config::{EngineConfig, ModelConfig, PipelineConfig, SourceConfig};
pub use error::{Error, ErrorCategory, Result};
pub use filter::{Filter, FeatureFilter, RangeCheck, RowFilter};
pub use kmeans::{KMeans, KMeansFit};
pub use model::{ClusterAssignment, ClusterModel};
pub use record::{FeatureColumn, Row, Table, CODE_COLUMN, FEATURE_DIM};
pub use vector::{FeatureVector, LabeledVector};
