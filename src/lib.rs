//! # nutriclust
//!
//! A batch pipeline that clusters nutritional records.
//!
//! Records are read from a table export, cleaned with three range filters,
//! packed into seven-dimensional nutrient vectors, clustered with seeded
//! k-means, scored with the silhouette coefficient, and the fitted model is
//! saved atomically.
//!
//! ## Quick Start
//!
//! ```bash
//! nutriclust --config conf/pipeline.toml run --table-name foods
//! nutriclust describe-model
//! ```
//!
//! ## As a Library
//!
//! ```rust,no_run
//! use nutriclust::prelude::*;
//!
//! let config = PipelineConfig::from_file("conf/pipeline.toml".as_ref()).unwrap();
//! let source = JsonTableSource::new(&config.source.data_dir, &config.source.keyspace).unwrap();
//! let report = Pipeline::new(config, source).unwrap().run("foods").unwrap();
//! println!("silhouette = {}", report.silhouette);
//! ```
//!
//! ## Crate Structure
//!
//! - `nutriclust-core` - Records, filtering, feature assembly, k-means, silhouette, configuration
//! - `nutriclust-storage` - Table sources and atomic model persistence

pub mod pipeline;

pub use nutriclust_core::{
    ClusterAssignment, ClusterModel, EngineConfig, Error, ErrorCategory, FeatureAssembler,
    FeatureColumn, FeatureFilter, FeatureVector, KMeans, LabeledVector, ModelConfig,
    PipelineConfig, Result, Row, SourceConfig, Table,
};
pub use nutriclust_storage::{JsonTableSource, MemoryTableSource, ModelStore, TableSource};
pub use pipeline::{Pipeline, RunReport};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ClusterModel, Error, FeatureVector, JsonTableSource, MemoryTableSource, ModelStore,
        Pipeline, PipelineConfig, Result, RunReport, Row, Table, TableSource,
    };
}
