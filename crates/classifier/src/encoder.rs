//! Column-wise preprocessing
//!
//! One-hot encodes categorical columns and passes numeric columns through.
//! A category that was not seen during fit encodes as an all-zero block and
//! is reported back to the caller instead of failing the row.

use std::collections::BTreeSet;

use beasiswa_dataset::FeatureRow;
use serde::{Deserialize, Serialize};

use crate::errors::TrainerError;

/// A categorical value that had no indicator slot at transform time
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownCategory {
    pub column: String,
    pub value: String,
}

/// Encoded feature vector of one row
#[derive(Clone, Debug, PartialEq)]
pub struct Encoded {
    pub values: Vec<f64>,
    pub unknown: Vec<UnknownCategory>,
}

impl Encoded {
    pub fn has_unknown(&self) -> bool {
        !self.unknown.is_empty()
    }
}

/// One-hot encoder over a fixed list of categorical columns
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    /// Sorted categories observed during fit, one list per column
    categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            categories: Vec::new(),
        }
    }

    /// Learn the category set of every column
    pub fn fit<R: FeatureRow>(&mut self, rows: &[R]) -> Result<(), TrainerError> {
        let mut seen: Vec<BTreeSet<String>> = vec![BTreeSet::new(); self.columns.len()];

        for row in rows {
            for (set, column) in seen.iter_mut().zip(&self.columns) {
                let value = row
                    .category(column)
                    .ok_or_else(|| TrainerError::MissingColumn(column.clone()))?;
                if !set.contains(value) {
                    set.insert(value.to_string());
                }
            }
        }

        self.categories = seen.into_iter().map(|set| set.into_iter().collect()).collect();
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }

    /// Number of indicator slots produced per row
    pub fn output_width(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    /// Append the indicator block of `row` to `out`
    pub fn transform_into<R: FeatureRow>(
        &self,
        row: &R,
        out: &mut Vec<f64>,
        unknown: &mut Vec<UnknownCategory>,
    ) -> Result<(), TrainerError> {
        for (column, categories) in self.columns.iter().zip(&self.categories) {
            let value = row
                .category(column)
                .ok_or_else(|| TrainerError::MissingColumn(column.clone()))?;

            let start = out.len();
            out.resize(start + categories.len(), 0.0);

            match categories.binary_search_by(|c| c.as_str().cmp(value)) {
                Ok(pos) => out[start + pos] = 1.0,
                Err(_) => unknown.push(UnknownCategory {
                    column: column.clone(),
                    value: value.to_string(),
                }),
            }
        }
        Ok(())
    }

    /// `<column>_<category>` for every indicator slot
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(&self.categories)
            .flat_map(|(column, categories)| {
                categories.iter().map(move |c| format!("{column}_{c}"))
            })
            .collect()
    }
}

/// Categorical block (one-hot) followed by numeric block (passthrough)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformer {
    encoder: OneHotEncoder,
    passthrough: Vec<String>,
}

impl ColumnTransformer {
    pub fn new(categorical: &[&str], numeric: &[&str]) -> Self {
        Self {
            encoder: OneHotEncoder::new(categorical),
            passthrough: numeric.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn fit<R: FeatureRow>(&mut self, rows: &[R]) -> Result<(), TrainerError> {
        for row in rows {
            for column in &self.passthrough {
                row.numeric(column)
                    .ok_or_else(|| TrainerError::MissingColumn(column.clone()))?;
            }
        }
        self.encoder.fit(rows)
    }

    pub fn transform<R: FeatureRow>(&self, row: &R) -> Result<Encoded, TrainerError> {
        let mut values = Vec::with_capacity(self.output_width());
        let mut unknown = Vec::new();

        self.encoder.transform_into(row, &mut values, &mut unknown)?;

        for column in &self.passthrough {
            let value = row
                .numeric(column)
                .ok_or_else(|| TrainerError::MissingColumn(column.clone()))?;
            values.push(value);
        }

        Ok(Encoded { values, unknown })
    }

    pub fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }

    pub fn output_width(&self) -> usize {
        self.encoder.output_width() + self.passthrough.len()
    }

    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.encoder.feature_names();
        names.extend(self.passthrough.iter().cloned());
        names
    }
}
