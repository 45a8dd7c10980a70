use crate::record::{FeatureColumn, Row, Table, CODE_COLUMN, FEATURE_DIM};
use crate::vector::{FeatureVector, LabeledVector};
use crate::{Error, Result};
use rayon::prelude::*;

/// Packs the nutrient columns of each row into a [`FeatureVector`].
#[derive(Debug, Clone)]
pub struct FeatureAssembler {
    columns: [FeatureColumn; FEATURE_DIM],
}

impl Default for FeatureAssembler {
    fn default() -> Self {
        Self {
            columns: FeatureColumn::ALL,
        }
    }
}

impl FeatureAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[FeatureColumn; FEATURE_DIM] {
        &self.columns
    }

    /// Assemble one vector per row, keeping the row's code alongside.
    pub fn assemble(&self, table: &Table) -> Result<Vec<LabeledVector>> {
        table.require_columns(
            std::iter::once(CODE_COLUMN).chain(self.columns.iter().map(|c| c.name())),
        )?;

        table
            .rows
            .par_iter()
            .map(|row| self.assemble_row(row))
            .collect()
    }

    fn assemble_row(&self, row: &Row) -> Result<LabeledVector> {
        let code = row.code().ok_or_else(|| Error::InvalidValue {
            code: String::from("<missing>"),
            column: CODE_COLUMN.to_string(),
        })?;

        let mut data = [0.0; FEATURE_DIM];
        for (slot, column) in data.iter_mut().zip(self.columns.iter()) {
            *slot = row.numeric(*column).ok_or_else(|| Error::InvalidValue {
                code: code.to_string(),
                column: column.name().to_string(),
            })?;
        }

        Ok(LabeledVector::new(code, FeatureVector::new(data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(code: &str) -> Row {
        Row::new()
            .with("code", code)
            .with("sodium_100g", json!(0.4))
            .with("energy_kcal_100g", json!(500))
            .with("fat_100g", json!(10.0))
            .with("carbohydrates_100g", "20")
            .with("sugars_100g", json!(5.0))
            .with("proteins_100g", json!(10.0))
            .with("salt_100g", json!(1.0))
            .with("ignored", "text")
    }

    #[test]
    fn test_fixed_column_order() {
        let mut table = Table::with_feature_schema("foods").with_rows(vec![row("a")]);
        table.columns.push("ignored".into());

        let vectors = FeatureAssembler::new().assemble(&table).unwrap();
        assert_eq!(vectors.len(), 1);
        assert_eq!(vectors[0].code, "a");
        assert_eq!(
            vectors[0].features.as_array(),
            &[500.0, 10.0, 20.0, 5.0, 10.0, 1.0, 0.4]
        );
        assert_eq!(vectors[0].features.dim(), 7);
    }

    #[test]
    fn test_missing_schema_column() {
        let mut table = Table::with_feature_schema("foods");
        table.columns.retain(|c| c != "proteins_100g");

        match FeatureAssembler::new().assemble(&table) {
            Err(Error::MissingColumn { table, column }) => {
                assert_eq!(table, "foods");
                assert_eq!(column, "proteins_100g");
            }
            other => panic!("expected missing column, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_code_column() {
        let mut table = Table::with_feature_schema("foods");
        table.columns.retain(|c| c != "code");
        assert!(matches!(
            FeatureAssembler::new().assemble(&table),
            Err(Error::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_non_numeric_cell_in_unfiltered_row() {
        let table = Table::with_feature_schema("foods")
            .with_rows(vec![row("a"), row("b").with("fat_100g", "lots")]);
        match FeatureAssembler::new().assemble(&table) {
            Err(Error::InvalidValue { code, column }) => {
                assert_eq!(code, "b");
                assert_eq!(column, "fat_100g");
            }
            other => panic!("expected invalid value, got {:?}", other),
        }
    }
}
