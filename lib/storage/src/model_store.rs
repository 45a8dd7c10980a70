use atomicwrites::{AllowOverwrite, AtomicFile};
use nutriclust_core::{ClusterModel, Error, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Version of the on-disk model layout.
pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct ModelFileRef<'a> {
    format_version: u32,
    #[serde(flatten)]
    model: &'a ClusterModel,
}

#[derive(Deserialize)]
struct ModelFile {
    format_version: u32,
    #[serde(flatten)]
    model: ClusterModel,
}

/// Reads and writes a fitted model at a fixed path.
///
/// Writes go to a temporary file in the target directory which is then
/// renamed over the target, so a failed save never leaves a truncated model
/// behind and the previous artifact survives.
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Serialize `model` and atomically replace whatever is at the path.
    ///
    /// A model that would not load back is rejected before anything is written.
    pub fn save(&self, model: &ClusterModel) -> Result<()> {
        model.validate()?;
        let data = serde_json::to_vec_pretty(&ModelFileRef {
            format_version: MODEL_FORMAT_VERSION,
            model,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Persistence(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        AtomicFile::new(&self.path, AllowOverwrite)
            .write(|f| f.write_all(&data))
            .map_err(|e| {
                Error::Persistence(format!("failed to write {}: {}", self.path.display(), e))
            })?;

        debug!("Wrote {} bytes to {:?}", data.len(), self.path);
        Ok(())
    }

    /// Read a model back and check it is well formed.
    pub fn load(&self) -> Result<ClusterModel> {
        let data = std::fs::read(&self.path).map_err(|e| {
            Error::Persistence(format!("cannot read model {}: {}", self.path.display(), e))
        })?;
        let file: ModelFile = serde_json::from_slice(&data).map_err(|e| {
            Error::Persistence(format!("corrupt model {}: {}", self.path.display(), e))
        })?;

        if file.format_version != MODEL_FORMAT_VERSION {
            return Err(Error::Persistence(format!(
                "unsupported model format version {} (expected {})",
                file.format_version, MODEL_FORMAT_VERSION
            )));
        }
        file.model.validate()?;
        Ok(file.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutriclust_core::{FeatureVector, KMeans};

    fn fitted(seed: u64) -> ClusterModel {
        let vectors: Vec<FeatureVector> = [0.0, 1.0, 50.0, 51.0, 90.0, 91.0]
            .iter()
            .map(|&x| FeatureVector::new([x, x / 2.0, 0.0, 1.0, 2.0, 0.1, 0.04]))
            .collect();
        KMeans::new(3).with_seed(seed).fit_vectors(&vectors).unwrap().0
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("nested/models/kmeans.json"));
        assert!(!store.exists());

        let model = fitted(42);
        store.save(&model).unwrap();
        assert!(store.exists());

        let loaded = store.load().unwrap();
        assert_eq!(loaded, model);
        assert_eq!(loaded.k(), 3);
        assert_eq!(loaded.seed(), 42);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("kmeans.json"));
        store.save(&fitted(1)).unwrap();
        store.save(&fitted(2)).unwrap();
        assert_eq!(store.load().unwrap().seed(), 2);

        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_failed_save_keeps_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("occupied");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep.txt"), b"keep").unwrap();

        let err = ModelStore::new(&target).save(&fitted(1)).unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
        assert_eq!(std::fs::read(target.join("keep.txt")).unwrap(), b"keep");
    }

    #[test]
    fn test_rejected_save_keeps_previous_model() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("kmeans.json"));
        store.save(&fitted(1)).unwrap();
        let before = std::fs::read(store.path()).unwrap();

        let mut json = serde_json::to_value(fitted(2)).unwrap();
        json["k"] = serde_json::json!(4);
        let broken: ClusterModel = serde_json::from_value(json).unwrap();

        assert!(matches!(store.save(&broken), Err(Error::Persistence(_))));
        assert_eq!(std::fs::read(store.path()).unwrap(), before);
        assert_eq!(store.load().unwrap().seed(), 1);
    }

    #[test]
    fn test_load_rejects_bad_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        assert!(matches!(ModelStore::new(&path).load(), Err(Error::Persistence(_))));

        std::fs::write(&path, b"{\"format_version\": 1, \"k\": 2").unwrap();
        assert!(matches!(ModelStore::new(&path).load(), Err(Error::Persistence(_))));

        let store = ModelStore::new(&path);
        store.save(&fitted(5)).unwrap();
        let mut json: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        json["format_version"] = serde_json::json!(99);
        std::fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();
        assert!(matches!(store.load(), Err(Error::Persistence(_))));
    }

    #[test]
    fn test_artifact_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("kmeans.json"));
        store.save(&fitted(9)).unwrap();

        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(store.path()).unwrap()).unwrap();
        assert_eq!(json["format_version"], 1);
        assert_eq!(json["k"], 3);
        assert_eq!(json["seed"], 9);
        assert_eq!(json["centroids"].as_array().unwrap().len(), 3);
        assert_eq!(json["centroids"][0].as_array().unwrap().len(), 7);
        assert_eq!(json["feature_columns"][0], "energy_kcal_100g");
    }
}
