// Table sources: where the pipeline reads its input records from
use nutriclust_core::{Error, Result, Row, Table};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads a named table of records.
pub trait TableSource {
    fn load(&self, table: &str) -> Result<Table>;

    /// First row of a table, if any.
    fn peek(&self, table: &str) -> Result<Option<Row>> {
        Ok(self.load(table)?.rows.into_iter().next())
    }
}

/// Table and keyspace names follow store identifier rules: ASCII letters,
/// digits and underscores.
pub fn validate_identifier(name: &str) -> Result<()> {
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!("invalid table identifier '{}'", name)))
    }
}

/// Reads table exports laid out as `<data_dir>/<keyspace>/<table>.json`.
#[derive(Debug, Clone)]
pub struct JsonTableSource {
    keyspace_dir: PathBuf,
}

impl JsonTableSource {
    pub fn new<P: AsRef<Path>>(data_dir: P, keyspace: &str) -> Result<Self> {
        validate_identifier(keyspace)?;
        Ok(Self {
            keyspace_dir: data_dir.as_ref().join(keyspace),
        })
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.keyspace_dir.join(format!("{}.json", table))
    }

    /// Write a table export; used to stage data for a run.
    pub fn store(&self, table: &Table) -> Result<PathBuf> {
        validate_identifier(&table.name)?;
        std::fs::create_dir_all(&self.keyspace_dir)?;
        let path = self.table_path(&table.name);
        std::fs::write(&path, serde_json::to_vec(table)?)?;
        Ok(path)
    }
}

impl TableSource for JsonTableSource {
    fn load(&self, table: &str) -> Result<Table> {
        validate_identifier(table)?;
        let path = self.table_path(table);
        if !path.is_file() {
            return Err(Error::TableNotFound(format!("{} ({})", table, path.display())));
        }

        let data = std::fs::read(&path)?;
        let mut loaded: Table = serde_json::from_slice(&data)?;
        if loaded.name.is_empty() {
            loaded.name = table.to_string();
        }
        debug!("Loaded {} rows from {:?}", loaded.len(), path);
        Ok(loaded)
    }
}

/// In-memory tables, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemoryTableSource {
    tables: HashMap<String, Table>,
}

impl MemoryTableSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    #[must_use]
    pub fn with_table(mut self, table: Table) -> Self {
        self.insert(table);
        self
    }
}

impl TableSource for MemoryTableSource {
    fn load(&self, table: &str) -> Result<Table> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| Error::TableNotFound(table.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutriclust_core::ErrorCategory;

    fn sample() -> Table {
        Table::with_feature_schema("foods").with_rows(vec![
            Row::new().with("code", "1").with("fat_100g", "3.5"),
            Row::new().with("code", "2").with("fat_100g", 4.0),
        ])
    }

    #[test]
    fn test_json_source_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonTableSource::new(dir.path(), "nutrition").unwrap();
        let path = source.store(&sample()).unwrap();
        assert_eq!(path, dir.path().join("nutrition").join("foods.json"));

        let loaded = source.load("foods").unwrap();
        assert_eq!(loaded, sample());
        assert_eq!(source.peek("foods").unwrap().unwrap().code(), Some("1"));
    }

    #[test]
    fn test_json_source_missing_table() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonTableSource::new(dir.path(), "nutrition").unwrap();
        let err = source.load("absent").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Source);
    }

    #[test]
    fn test_rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        assert!(JsonTableSource::new(dir.path(), "../etc").is_err());

        let source = JsonTableSource::new(dir.path(), "nutrition").unwrap();
        let err = source.load("../../secret").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_export_without_name_takes_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonTableSource::new(dir.path(), "ks").unwrap();
        std::fs::create_dir_all(dir.path().join("ks")).unwrap();
        std::fs::write(
            source.table_path("products"),
            br#"{"name": "", "columns": ["code"], "rows": []}"#,
        )
        .unwrap();
        let table = source.load("products").unwrap();
        assert_eq!(table.name, "products");
        assert!(source.peek("products").unwrap().is_none());
    }

    #[test]
    fn test_memory_source() {
        let source = MemoryTableSource::new().with_table(sample());
        assert_eq!(source.load("foods").unwrap().len(), 2);
        assert!(matches!(source.load("other"), Err(Error::TableNotFound(_))));
    }
}
