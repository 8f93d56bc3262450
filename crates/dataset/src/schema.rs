//! Applicant record schema
//!
//! Column names, categorical domains and numeric bounds of the scholarship
//! dataset, plus the row types that flow from the CSV loader into the
//! classifier.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const COL_IPK: &str = "IPK";
pub const COL_PENGHASILAN_ORTU: &str = "Penghasilan_Ortu";
pub const COL_JUMLAH_TANGGUNGAN: &str = "Jumlah_Tanggungan";
pub const COL_ORGANISASI: &str = "Organisasi";
pub const COL_PRESTASI: &str = "Prestasi";

/// Target column, present in the training table only
pub const TARGET_COLUMN: &str = "Kelayakan_Beasiswa";

/// Feature columns in table order
pub const FEATURE_COLUMNS: [&str; 5] = [
    COL_IPK,
    COL_PENGHASILAN_ORTU,
    COL_JUMLAH_TANGGUNGAN,
    COL_ORGANISASI,
    COL_PRESTASI,
];

/// Every column the loader requires
pub const SCHEMA_COLUMNS: [&str; 6] = [
    COL_IPK,
    COL_PENGHASILAN_ORTU,
    COL_JUMLAH_TANGGUNGAN,
    COL_ORGANISASI,
    COL_PRESTASI,
    TARGET_COLUMN,
];

pub const CATEGORICAL_COLUMNS: [&str; 3] = [COL_PENGHASILAN_ORTU, COL_ORGANISASI, COL_PRESTASI];
pub const NUMERIC_COLUMNS: [&str; 2] = [COL_IPK, COL_JUMLAH_TANGGUNGAN];

pub const PENGHASILAN_CHOICES: [&str; 3] = ["<=2jt", "2-5jt", ">5jt"];
pub const ORGANISASI_CHOICES: [&str; 2] = ["Tidak Aktif", "Aktif"];
pub const PRESTASI_CHOICES: [&str; 4] = ["Tidak ada", "Lokal", "Nasional", "Internasional"];

/// Grade point average bounds and slider step
pub const IPK_RANGE: RangeInclusive<f64> = 2.0..=4.0;
pub const IPK_STEP: f64 = 0.01;
pub const TANGGUNGAN_RANGE: RangeInclusive<i64> = 1..=10;

pub const POSITIVE_LABEL: &str = "Layak";
pub const NEGATIVE_LABEL: &str = "Tidak Layak";

/// Column-name lookup over a single row.
///
/// Returns `None` when the row has no such column or the column has the
/// other kind (a category asked for as a number, or vice versa).
pub trait FeatureRow {
    fn numeric(&self, column: &str) -> Option<f64>;
    fn category(&self, column: &str) -> Option<&str>;
}

impl<T: FeatureRow + ?Sized> FeatureRow for &T {
    fn numeric(&self, column: &str) -> Option<f64> {
        (**self).numeric(column)
    }

    fn category(&self, column: &str) -> Option<&str> {
        (**self).category(column)
    }
}

/// Feature attributes of one applicant, i.e. a prediction input row
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApplicantFeatures {
    #[serde(rename = "IPK")]
    pub ipk: f64,
    #[serde(rename = "Penghasilan_Ortu")]
    pub penghasilan_ortu: String,
    #[serde(rename = "Jumlah_Tanggungan")]
    pub jumlah_tanggungan: i64,
    #[serde(rename = "Organisasi")]
    pub organisasi: String,
    #[serde(rename = "Prestasi")]
    pub prestasi: String,
}

impl ApplicantFeatures {
    /// Default form state: IPK 3.25, three dependents, first choice of each selector
    pub fn form_default() -> Self {
        Self {
            ipk: 3.25,
            penghasilan_ortu: PENGHASILAN_CHOICES[0].to_string(),
            jumlah_tanggungan: 3,
            organisasi: ORGANISASI_CHOICES[0].to_string(),
            prestasi: PRESTASI_CHOICES[0].to_string(),
        }
    }

    /// Check the numeric attributes against their domains.
    /// Categorical values are accepted as-is; unseen ones are reported at
    /// prediction time.
    pub fn validate_ranges(&self) -> Result<(), String> {
        if !self.ipk.is_finite() || !IPK_RANGE.contains(&self.ipk) {
            return Err(format!(
                "{} must lie in [{:.2}, {:.2}], got {}",
                COL_IPK,
                IPK_RANGE.start(),
                IPK_RANGE.end(),
                self.ipk
            ));
        }
        if !TANGGUNGAN_RANGE.contains(&self.jumlah_tanggungan) {
            return Err(format!(
                "{} must lie in [{}, {}], got {}",
                COL_JUMLAH_TANGGUNGAN,
                TANGGUNGAN_RANGE.start(),
                TANGGUNGAN_RANGE.end(),
                self.jumlah_tanggungan
            ));
        }
        Ok(())
    }
}

impl FeatureRow for ApplicantFeatures {
    fn numeric(&self, column: &str) -> Option<f64> {
        match column {
            COL_IPK => Some(self.ipk),
            COL_JUMLAH_TANGGUNGAN => Some(self.jumlah_tanggungan as f64),
            _ => None,
        }
    }

    fn category(&self, column: &str) -> Option<&str> {
        match column {
            COL_PENGHASILAN_ORTU => Some(&self.penghasilan_ortu),
            COL_ORGANISASI => Some(&self.organisasi),
            COL_PRESTASI => Some(&self.prestasi),
            _ => None,
        }
    }
}

/// One row of the training table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    #[serde(rename = "IPK")]
    pub ipk: f64,
    #[serde(rename = "Penghasilan_Ortu")]
    pub penghasilan_ortu: String,
    #[serde(rename = "Jumlah_Tanggungan")]
    pub jumlah_tanggungan: i64,
    #[serde(rename = "Organisasi")]
    pub organisasi: String,
    #[serde(rename = "Prestasi")]
    pub prestasi: String,
    #[serde(rename = "Kelayakan_Beasiswa")]
    pub kelayakan_beasiswa: String,
}

impl ApplicantRecord {
    pub fn new(features: ApplicantFeatures, label: impl Into<String>) -> Self {
        Self {
            ipk: features.ipk,
            penghasilan_ortu: features.penghasilan_ortu,
            jumlah_tanggungan: features.jumlah_tanggungan,
            organisasi: features.organisasi,
            prestasi: features.prestasi,
            kelayakan_beasiswa: label.into(),
        }
    }

    /// Copy of the row without the target column
    pub fn features(&self) -> ApplicantFeatures {
        ApplicantFeatures {
            ipk: self.ipk,
            penghasilan_ortu: self.penghasilan_ortu.clone(),
            jumlah_tanggungan: self.jumlah_tanggungan,
            organisasi: self.organisasi.clone(),
            prestasi: self.prestasi.clone(),
        }
    }

    pub fn label(&self) -> &str {
        &self.kelayakan_beasiswa
    }

    /// Cell values as display strings, in `SCHEMA_COLUMNS` order
    pub fn cells(&self) -> [String; 6] {
        [
            format!("{:.2}", self.ipk),
            self.penghasilan_ortu.clone(),
            self.jumlah_tanggungan.to_string(),
            self.organisasi.clone(),
            self.prestasi.clone(),
            self.kelayakan_beasiswa.clone(),
        ]
    }
}

impl FeatureRow for ApplicantRecord {
    fn numeric(&self, column: &str) -> Option<f64> {
        match column {
            COL_IPK => Some(self.ipk),
            COL_JUMLAH_TANGGUNGAN => Some(self.jumlah_tanggungan as f64),
            _ => None,
        }
    }

    fn category(&self, column: &str) -> Option<&str> {
        match column {
            COL_PENGHASILAN_ORTU => Some(&self.penghasilan_ortu),
            COL_ORGANISASI => Some(&self.organisasi),
            COL_PRESTASI => Some(&self.prestasi),
            _ => None,
        }
    }
}
