use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Name of the identity column. Metadata only, never a feature.
pub const CODE_COLUMN: &str = "code";

/// Number of numeric fields per record.
pub const FEATURE_DIM: usize = 7;

/// Nutrient columns in feature-vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureColumn {
    Energy,
    Fat,
    Carbohydrates,
    Sugars,
    Proteins,
    Salt,
    Sodium,
}

impl FeatureColumn {
    /// All feature columns, in the order they are packed into a vector.
    pub const ALL: [FeatureColumn; FEATURE_DIM] = [
        FeatureColumn::Energy,
        FeatureColumn::Fat,
        FeatureColumn::Carbohydrates,
        FeatureColumn::Sugars,
        FeatureColumn::Proteins,
        FeatureColumn::Salt,
        FeatureColumn::Sodium,
    ];

    /// Mass-based columns (grams per 100g), i.e. everything except energy.
    pub const MASS: [FeatureColumn; FEATURE_DIM - 1] = [
        FeatureColumn::Fat,
        FeatureColumn::Carbohydrates,
        FeatureColumn::Sugars,
        FeatureColumn::Proteins,
        FeatureColumn::Salt,
        FeatureColumn::Sodium,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FeatureColumn::Energy => "energy_kcal_100g",
            FeatureColumn::Fat => "fat_100g",
            FeatureColumn::Carbohydrates => "carbohydrates_100g",
            FeatureColumn::Sugars => "sugars_100g",
            FeatureColumn::Proteins => "proteins_100g",
            FeatureColumn::Salt => "salt_100g",
            FeatureColumn::Sodium => "sodium_100g",
        }
    }

    /// Position of this column inside a feature vector.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|c| c.name().to_string()).collect()
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One record of a table, keyed by column name.
///
/// The store keeps every column as text, so a cell may hold a JSON number,
/// a numeric string, or null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    cells: Map<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.cells.insert(column.to_string(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    /// Record identity, if present and textual.
    pub fn code(&self) -> Option<&str> {
        match self.cells.get(CODE_COLUMN)? {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric value of a feature cell.
    ///
    /// Missing, null, non-numeric and non-finite cells yield `None`, which
    /// fails every range comparison.
    pub fn numeric(&self, column: FeatureColumn) -> Option<f64> {
        let value = match self.cells.get(column.name())? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        value.is_finite().then_some(value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &String> {
        self.cells.keys()
    }
}

impl From<Map<String, Value>> for Row {
    fn from(cells: Map<String, Value>) -> Self {
        Self { cells }
    }
}

/// A named table: a column schema plus its rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    /// Empty table carrying the code column and every feature column.
    pub fn with_feature_schema(name: impl Into<String>) -> Self {
        let mut columns = vec![CODE_COLUMN.to_string()];
        columns.extend(FeatureColumn::names());
        Self::new(name, columns, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Fails with [`crate::Error::MissingColumn`] on the first absent column.
    pub fn require_columns<'a>(&self, columns: impl IntoIterator<Item = &'a str>) -> crate::Result<()> {
        for column in columns {
            if !self.has_column(column) {
                return Err(crate::Error::MissingColumn {
                    table: self.name.clone(),
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Same schema, different rows.
    #[must_use]
    pub fn with_rows(&self, rows: Vec<Row>) -> Self {
        Self {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows,
        }
    }
}
