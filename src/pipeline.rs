use nutriclust_core::{
    silhouette, Error, FeatureAssembler, FeatureFilter, KMeans, PipelineConfig, Result,
};
use nutriclust_storage::{ModelStore, TableSource};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Summary of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub table: String,
    pub rows_loaded: usize,
    pub rows_retained: usize,
    pub k: usize,
    pub seed: u64,
    pub iterations: usize,
    pub cluster_sizes: Vec<usize>,
    pub silhouette: f64,
    pub model_path: PathBuf,
}

/// Load → filter → assemble → train → evaluate → save.
///
/// Each stage blocks until the previous one has produced its full output.
/// The model is written only after evaluation succeeds.
pub struct Pipeline<S> {
    config: PipelineConfig,
    source: S,
    filter: FeatureFilter,
    assembler: FeatureAssembler,
    store: ModelStore,
}

impl<S: TableSource + Sync> Pipeline<S> {
    pub fn new(config: PipelineConfig, source: S) -> Result<Self> {
        config.validate()?;
        let store = ModelStore::new(&config.model.save_path);
        Ok(Self {
            config,
            source,
            filter: FeatureFilter::new(),
            assembler: FeatureAssembler::new(),
            store,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// Run every stage on a rayon pool sized by `engine.threads`.
    pub fn run(&self, table_name: &str) -> Result<RunReport> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.engine.threads)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("cannot start worker pool: {}", e)))?;
        pool.install(|| self.run_stages(table_name))
    }

    fn run_stages(&self, table_name: &str) -> Result<RunReport> {
        let table = self.source.load(table_name)?;
        info!("Loaded {} rows from table '{}'", table.len(), table.name);

        let filtered = self.filter.apply(&table)?;
        info!(
            "Kept {} of {} rows after filtering",
            filtered.len(),
            table.len()
        );

        let vectors = self.assembler.assemble(&filtered)?;

        let kmeans = KMeans::from_config(&self.config.model, &self.config.engine);
        let fit = kmeans.fit(&vectors)?;
        info!(
            "Fitted k-means with k={} seed={} in {} iterations (cost {:.4})",
            fit.model.k(),
            fit.model.seed(),
            fit.model.iterations(),
            fit.model.cost()
        );

        let mut cluster_sizes = vec![0usize; fit.model.k()];
        for assignment in &fit.assignments {
            cluster_sizes[assignment.cluster] += 1;
        }
        info!("Cluster sizes: {:?}", cluster_sizes);

        let score = silhouette::evaluate(&vectors, &fit.assignments)?;
        info!("Silhouette score: {}", score);

        self.store.save(&fit.model)?;
        info!("Model saved to {}", self.store.path().display());

        Ok(RunReport {
            table: table.name,
            rows_loaded: table.rows.len(),
            rows_retained: filtered.len(),
            k: fit.model.k(),
            seed: fit.model.seed(),
            iterations: fit.model.iterations(),
            cluster_sizes,
            silhouette: score,
            model_path: self.store.path().to_path_buf(),
        })
    }
}
