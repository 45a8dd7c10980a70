// Row-level range checks that discard physically impossible records
use crate::record::{FeatureColumn, Row, Table};
use crate::Result;
use rayon::prelude::*;
use tracing::debug;

/// Energy density of pure fat; no product can exceed it.
pub const MAX_ENERGY_KCAL: f64 = 1000.0;

/// No nutrient can weigh more than the 100g portion it is measured on.
pub const MAX_MASS_GRAMS: f64 = 100.0;

pub trait Filter {
    fn matches(&self, row: &Row) -> bool;
}

/// A single bound on a single column.
///
/// A cell without a numeric value fails every check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeCheck {
    LessThan { column: FeatureColumn, bound: f64 },
    GreaterEqual { column: FeatureColumn, bound: f64 },
}

impl RangeCheck {
    pub fn column(&self) -> FeatureColumn {
        match self {
            RangeCheck::LessThan { column, .. } | RangeCheck::GreaterEqual { column, .. } => *column,
        }
    }

    /// Apply the bound to a raw value.
    #[inline]
    pub fn passes(&self, value: f64) -> bool {
        match self {
            RangeCheck::LessThan { bound, .. } => value < *bound,
            RangeCheck::GreaterEqual { bound, .. } => value >= *bound,
        }
    }
}

impl Filter for RangeCheck {
    fn matches(&self, row: &Row) -> bool {
        row.numeric(self.column())
            .map(|v| self.passes(v))
            .unwrap_or(false)
    }
}

/// A named conjunction of range checks.
#[derive(Debug, Clone)]
pub struct RowFilter {
    name: &'static str,
    checks: Vec<RangeCheck>,
}

impl RowFilter {
    pub fn new(name: &'static str, checks: Vec<RangeCheck>) -> Self {
        Self { name, checks }
    }

    /// `energy_kcal_100g < 1000`
    pub fn energy_bound() -> Self {
        Self::new(
            "energy_bound",
            vec![RangeCheck::LessThan {
                column: FeatureColumn::Energy,
                bound: MAX_ENERGY_KCAL,
            }],
        )
    }

    /// Every mass column `< 100`. Energy is deliberately not part of this check.
    pub fn mass_bound() -> Self {
        Self::new(
            "mass_bound",
            FeatureColumn::MASS
                .iter()
                .map(|&column| RangeCheck::LessThan {
                    column,
                    bound: MAX_MASS_GRAMS,
                })
                .collect(),
        )
    }

    /// Every feature column, energy included, `>= 0`.
    pub fn non_negative() -> Self {
        Self::new(
            "non_negative",
            FeatureColumn::ALL
                .iter()
                .map(|&column| RangeCheck::GreaterEqual { column, bound: 0.0 })
                .collect(),
        )
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn checks(&self) -> &[RangeCheck] {
        &self.checks
    }
}

impl Filter for RowFilter {
    fn matches(&self, row: &Row) -> bool {
        self.checks.iter().all(|c| c.matches(row))
    }
}

/// The three cleaning stages, applied in order.
#[derive(Debug, Clone)]
pub struct FeatureFilter {
    stages: Vec<RowFilter>,
}

impl Default for FeatureFilter {
    fn default() -> Self {
        Self {
            stages: vec![
                RowFilter::energy_bound(),
                RowFilter::mass_bound(),
                RowFilter::non_negative(),
            ],
        }
    }
}

impl FeatureFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stages(&self) -> &[RowFilter] {
        &self.stages
    }

    /// Return the rows of `table` that pass every stage, in input order.
    ///
    /// Fails if the table schema lacks a feature column.
    pub fn apply(&self, table: &Table) -> Result<Table> {
        table.require_columns(FeatureColumn::ALL.iter().map(|c| c.name()))?;

        let mut rows: Vec<&Row> = table.rows.iter().collect();
        for stage in &self.stages {
            let before = rows.len();
            rows = rows.into_par_iter().filter(|row| stage.matches(row)).collect();
            debug!(
                "Filter stage {}: kept {} of {} rows in '{}'",
                stage.name(),
                rows.len(),
                before,
                table.name
            );
        }

        Ok(table.with_rows(rows.into_iter().cloned().collect()))
    }
}

impl Filter for FeatureFilter {
    fn matches(&self, row: &Row) -> bool {
        self.stages.iter().all(|s| s.matches(row))
    }
}
