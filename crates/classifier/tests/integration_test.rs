//! Integration tests for the scholarship classifier
//!
//! Trains on the bundled dataset and checks the contract of the fitted
//! pipeline: determinism, class set, probability vectors and the unknown
//! category fallback.

use anyhow::Result;
use beasiswa_classifier::{
    stratified_split, train_model_from_csv, ModelTrainer, TrainedModel, TrainerError,
    TrainingParams,
};
use beasiswa_dataset::{ApplicantFeatures, Dataset};
use once_cell::sync::Lazy;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn bundled_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/data_beasiswa.csv")
}

static DATASET: Lazy<Dataset> =
    Lazy::new(|| Dataset::from_csv(bundled_path()).expect("bundled dataset loads"));

static MODEL: Lazy<TrainedModel> = Lazy::new(|| {
    ModelTrainer::new(TrainingParams::default())
        .train(&DATASET)
        .expect("bundled dataset trains")
});

fn probe_row() -> ApplicantFeatures {
    ApplicantFeatures {
        ipk: 3.25,
        penghasilan_ortu: "2-5jt".to_string(),
        jumlah_tanggungan: 3,
        organisasi: "Aktif".to_string(),
        prestasi: "Nasional".to_string(),
    }
}

#[test]
fn test_accuracy_in_unit_interval() {
    assert!((0.0..=1.0).contains(&MODEL.accuracy));
    assert_eq!(
        MODEL.metadata.train_rows + MODEL.metadata.test_rows,
        DATASET.len()
    );
    assert!(MODEL.metadata.tree_depth <= 5);
    assert_eq!(MODEL.metadata.dataset_fingerprint, DATASET.fingerprint().to_hex());
}

#[test]
fn test_deterministic_training() -> Result<()> {
    let trainer = ModelTrainer::new(TrainingParams::default());
    let model1 = trainer.train(&DATASET)?;
    let model2 = trainer.train(&DATASET)?;

    assert_eq!(model1.accuracy.to_bits(), model2.accuracy.to_bits());
    assert_eq!(model1.metadata.model_hash, model2.metadata.model_hash);

    let p1 = model1.pipeline.predict(&probe_row())?;
    let p2 = model2.pipeline.predict(&probe_row())?;
    assert_eq!(p1, p2);

    Ok(())
}

#[test]
fn test_probe_row_contract() -> Result<()> {
    let prediction = MODEL.pipeline.predict(&probe_row())?;

    assert!(prediction.label == "Layak" || prediction.label == "Tidak Layak");
    assert_eq!(prediction.probabilities.len(), 2);
    for p in &prediction.probabilities {
        assert!((0.0..=1.0).contains(&p.probability));
    }
    assert_eq!(prediction.probabilities[0].label, "Layak");
    assert_eq!(prediction.probabilities[1].label, "Tidak Layak");

    Ok(())
}

#[test]
fn test_unknown_category_does_not_raise() -> Result<()> {
    let mut row = probe_row();
    row.prestasi = "Regional".to_string();

    let prediction = MODEL.pipeline.predict(&row)?;
    assert!(MODEL.pipeline.classes().contains(&prediction.label));
    assert_eq!(prediction.probabilities.len(), 2);
    assert_eq!(prediction.unknown_categories.len(), 1);
    assert_eq!(prediction.unknown_categories[0].column, "Prestasi");

    Ok(())
}

#[test]
fn test_predictions_are_observed_labels() -> Result<()> {
    let observed: BTreeSet<&str> = DATASET.labels().into_iter().collect();
    for record in DATASET.records() {
        let label = MODEL.pipeline.predict_label(record)?;
        assert!(observed.contains(label));
    }
    Ok(())
}

#[test]
fn test_stratified_split_keeps_ratio() -> Result<()> {
    let classes: Vec<String> = DATASET.label_counts().into_keys().collect();
    let targets: Vec<usize> = DATASET
        .labels()
        .iter()
        .map(|l| classes.iter().position(|c| c == l).unwrap())
        .collect();

    let split = stratified_split(&targets, &classes, 0.2, 42)?;
    let ratio = |rows: &[usize]| {
        rows.iter().filter(|&&i| targets[i] == 0).count() as f64 / rows.len() as f64
    };
    let full = targets.iter().filter(|&&t| t == 0).count() as f64 / targets.len() as f64;

    // One row of slack on each partition
    assert!((ratio(&split.test) - full).abs() <= 1.0 / split.test.len() as f64);
    assert!((ratio(&split.train) - full).abs() <= 1.0 / split.train.len() as f64);

    Ok(())
}

#[test]
fn test_train_model_from_csv() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(
        file,
        "IPK,Penghasilan_Ortu,Jumlah_Tanggungan,Organisasi,Prestasi,Kelayakan_Beasiswa"
    )?;
    for i in 0..20 {
        let ipk = 2.0 + i as f64 * 0.1;
        let label = if ipk >= 3.0 { "Layak" } else { "Tidak Layak" };
        writeln!(file, "{ipk:.2},<=2jt,{},Aktif,Lokal,{label}", i % 10 + 1)?;
    }
    file.flush()?;

    let model = train_model_from_csv(file.path(), TrainingParams::default())?;
    assert_eq!(model.metadata.test_rows, 4);
    assert_eq!(model.pipeline.classes(), &["Layak", "Tidak Layak"]);

    Ok(())
}

#[test]
fn test_missing_csv_is_dataset_error() {
    let err = train_model_from_csv(
        std::path::Path::new("/nonexistent/data.csv"),
        TrainingParams::default(),
    )
    .unwrap_err();
    assert!(matches!(err, TrainerError::Dataset(_)));
}

fn any_category(choices: &'static [&'static str]) -> impl Strategy<Value = String> {
    prop_oneof![
        4 => proptest::sample::select(choices).prop_map(str::to_string),
        1 => "[A-Za-z ]{1,12}",
    ]
}

proptest! {
    #[test]
    fn prop_probabilities_sum_to_one(
        ipk in 2.0f64..=4.0,
        deps in 1i64..=10,
        income in any_category(&["<=2jt", "2-5jt", ">5jt"]),
        org in any_category(&["Tidak Aktif", "Aktif"]),
        achievement in any_category(&["Tidak ada", "Lokal", "Nasional", "Internasional"]),
    ) {
        let row = ApplicantFeatures {
            ipk,
            penghasilan_ortu: income,
            jumlah_tanggungan: deps,
            organisasi: org,
            prestasi: achievement,
        };

        let prediction = MODEL.pipeline.predict(&row).unwrap();
        let total: f64 = prediction.probabilities.iter().map(|p| p.probability).sum();
        prop_assert!((total - 1.0).abs() < 1e-9);
        prop_assert!(MODEL.pipeline.classes().contains(&prediction.label));

        let best = prediction
            .probabilities
            .iter()
            .map(|p| p.probability)
            .fold(f64::MIN, f64::max);
        let chosen = prediction
            .probabilities
            .iter()
            .find(|p| p.label == prediction.label)
            .unwrap();
        prop_assert_eq!(chosen.probability, best);
    }
}
