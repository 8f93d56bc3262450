//! Preprocessing + classification pipeline
//!
//! Couples the fitted column transformer with the decision tree and the
//! ordered class labels, and exposes predict / predict-probability / score.

use std::collections::BTreeSet;

use beasiswa_dataset::{FeatureRow, CATEGORICAL_COLUMNS, NUMERIC_COLUMNS};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cart::{CartBuilder, Tree, TreeConfig};
use crate::encoder::{ColumnTransformer, UnknownCategory};
use crate::errors::TrainerError;

/// Probability assigned to one class
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassProbability {
    pub label: String,
    pub probability: f64,
}

/// Result of classifying one row
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    /// One entry per class, in class order
    pub probabilities: Vec<ClassProbability>,
    /// Categorical values that were encoded as all-zero blocks
    pub unknown_categories: Vec<UnknownCategory>,
}

impl Prediction {
    pub fn is_label(&self, label: &str) -> bool {
        self.label == label
    }
}

/// Fitted pipeline
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    transformer: ColumnTransformer,
    tree: Tree,
    classes: Vec<String>,
}

impl Pipeline {
    /// Fit on the applicant schema: one-hot over the categorical columns,
    /// passthrough for the numeric ones
    pub fn fit<R: FeatureRow>(
        rows: &[R],
        labels: &[&str],
        config: TreeConfig,
    ) -> Result<Self, TrainerError> {
        let transformer = ColumnTransformer::new(&CATEGORICAL_COLUMNS, &NUMERIC_COLUMNS);
        Self::fit_with(transformer, rows, labels, config)
    }

    /// Fit with a caller-provided (unfitted) transformer
    pub fn fit_with<R: FeatureRow>(
        mut transformer: ColumnTransformer,
        rows: &[R],
        labels: &[&str],
        config: TreeConfig,
    ) -> Result<Self, TrainerError> {
        if rows.len() != labels.len() {
            return Err(TrainerError::LengthMismatch {
                rows: rows.len(),
                labels: labels.len(),
            });
        }
        if rows.is_empty() {
            return Err(TrainerError::EmptyTrainingSet);
        }

        let classes: Vec<String> = labels
            .iter()
            .copied()
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .map(str::to_string)
            .collect();
        let targets: Vec<usize> = labels
            .iter()
            .map(|label| classes.partition_point(|c| c.as_str() < *label))
            .collect();

        transformer.fit(rows)?;
        let features = rows
            .iter()
            .map(|row| transformer.transform(row).map(|e| e.values))
            .collect::<Result<Vec<_>, _>>()?;

        let tree = CartBuilder::new(&features, &targets, classes.len(), config).build();
        debug!(
            rows = rows.len(),
            classes = classes.len(),
            nodes = tree.node_count(),
            depth = tree.depth(),
            "pipeline fitted"
        );

        Ok(Self {
            transformer,
            tree,
            classes,
        })
    }

    /// Class labels in probability order (sorted)
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn transformer(&self) -> &ColumnTransformer {
        &self.transformer
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.transformer.feature_names()
    }

    /// Classify one row, reporting any unknown categories
    pub fn predict<R: FeatureRow>(&self, row: &R) -> Result<Prediction, TrainerError> {
        let encoded = self.transformer.transform(row)?;
        for unknown in &encoded.unknown {
            warn!(
                column = %unknown.column,
                value = %unknown.value,
                "category not seen during training, encoded as zero vector"
            );
        }

        let leaf = self.tree.leaf_for(&encoded.values);
        let probabilities = self
            .classes
            .iter()
            .zip(leaf.probabilities())
            .map(|(label, probability)| ClassProbability {
                label: label.clone(),
                probability,
            })
            .collect();
        let label = self.classes[self.tree.predict(&encoded.values)].clone();

        debug!(label = %label, "prediction");
        Ok(Prediction {
            label,
            probabilities,
            unknown_categories: encoded.unknown,
        })
    }

    /// Most likely label for one row
    pub fn predict_label<R: FeatureRow>(&self, row: &R) -> Result<&str, TrainerError> {
        let encoded = self.transformer.transform(row)?;
        Ok(&self.classes[self.tree.predict(&encoded.values)])
    }

    /// Probability per class for one row, in class order
    pub fn predict_proba<R: FeatureRow>(&self, row: &R) -> Result<Vec<f64>, TrainerError> {
        let encoded = self.transformer.transform(row)?;
        Ok(self.tree.predict_proba(&encoded.values))
    }

    /// Fraction of rows whose predicted label equals the given label
    pub fn score<R: FeatureRow>(&self, rows: &[R], labels: &[&str]) -> Result<f64, TrainerError> {
        if rows.len() != labels.len() {
            return Err(TrainerError::LengthMismatch {
                rows: rows.len(),
                labels: labels.len(),
            });
        }
        if rows.is_empty() {
            return Ok(0.0);
        }

        let mut correct = 0usize;
        for (row, &expected) in rows.iter().zip(labels) {
            if self.predict_label(row)? == expected {
                correct += 1;
            }
        }
        Ok(correct as f64 / rows.len() as f64)
    }

    /// BLAKE3 hash of the canonical JSON of the fitted state
    pub fn model_hash(&self) -> Result<String, TrainerError> {
        let canonical = serde_json::to_vec(self)?;
        Ok(hex::encode(blake3::hash(&canonical).as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beasiswa_dataset::ApplicantFeatures;

    fn row(ipk: f64, income: &str, deps: i64, org: &str, achievement: &str) -> ApplicantFeatures {
        ApplicantFeatures {
            ipk,
            penghasilan_ortu: income.to_string(),
            jumlah_tanggungan: deps,
            organisasi: org.to_string(),
            prestasi: achievement.to_string(),
        }
    }

    fn training_rows() -> (Vec<ApplicantFeatures>, Vec<&'static str>) {
        let rows = vec![
            row(3.8, "<=2jt", 5, "Aktif", "Nasional"),
            row(3.6, "<=2jt", 4, "Aktif", "Lokal"),
            row(3.4, "2-5jt", 6, "Aktif", "Internasional"),
            row(3.9, "<=2jt", 3, "Tidak Aktif", "Nasional"),
            row(2.3, ">5jt", 1, "Tidak Aktif", "Tidak ada"),
            row(2.6, ">5jt", 2, "Tidak Aktif", "Tidak ada"),
            row(2.9, "2-5jt", 1, "Tidak Aktif", "Lokal"),
            row(2.2, "<=2jt", 2, "Aktif", "Tidak ada"),
        ];
        let labels = vec![
            "Layak",
            "Layak",
            "Layak",
            "Layak",
            "Tidak Layak",
            "Tidak Layak",
            "Tidak Layak",
            "Tidak Layak",
        ];
        (rows, labels)
    }

    #[test]
    fn test_fit_and_predict() {
        let (rows, labels) = training_rows();
        let pipeline = Pipeline::fit(&rows, &labels, TreeConfig::default()).unwrap();

        assert_eq!(pipeline.classes(), &["Layak", "Tidak Layak"]);
        assert_eq!(pipeline.score(&rows, &labels).unwrap(), 1.0);

        let prediction = pipeline.predict(&row(3.7, "<=2jt", 4, "Aktif", "Nasional")).unwrap();
        assert_eq!(prediction.label, "Layak");
        assert_eq!(prediction.probabilities.len(), 2);
        assert_eq!(prediction.probabilities[0].label, "Layak");
        assert!(prediction.unknown_categories.is_empty());
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (rows, labels) = training_rows();
        let pipeline = Pipeline::fit(&rows, &labels, TreeConfig::default()).unwrap();

        for r in &rows {
            let p: f64 = pipeline.predict_proba(r).unwrap().iter().sum();
            assert!((p - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_unknown_category_still_predicts() {
        let (rows, labels) = training_rows();
        let pipeline = Pipeline::fit(&rows, &labels, TreeConfig::default()).unwrap();

        let prediction = pipeline
            .predict(&row(3.25, "2-5jt", 3, "Aktif", "Regional"))
            .unwrap();
        assert!(pipeline.classes().contains(&prediction.label));
        assert_eq!(prediction.probabilities.len(), 2);
        assert_eq!(prediction.unknown_categories.len(), 1);
        assert_eq!(prediction.unknown_categories[0].value, "Regional");
    }

    #[test]
    fn test_length_mismatch() {
        let (rows, _) = training_rows();
        let err = Pipeline::fit(&rows, &["Layak"], TreeConfig::default()).unwrap_err();
        assert!(matches!(err, TrainerError::LengthMismatch { rows: 8, labels: 1 }));
    }

    #[test]
    fn test_empty_training_set() {
        let rows: Vec<ApplicantFeatures> = Vec::new();
        let err = Pipeline::fit(&rows, &[], TreeConfig::default()).unwrap_err();
        assert!(matches!(err, TrainerError::EmptyTrainingSet));
    }

    #[test]
    fn test_model_hash_is_stable() {
        let (rows, labels) = training_rows();
        let a = Pipeline::fit(&rows, &labels, TreeConfig::default()).unwrap();
        let b = Pipeline::fit(&rows, &labels, TreeConfig::default()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.model_hash().unwrap(), b.model_hash().unwrap());
        assert_eq!(a.model_hash().unwrap().len(), 64);
    }
}
