//! CSV dataset loading
//!
//! Reads the applicant table once, checks the header against the schema and
//! keeps the rows immutable for the rest of the process.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::errors::DatasetError;
use crate::schema::{ApplicantRecord, COL_IPK, COL_JUMLAH_TANGGUNGAN, SCHEMA_COLUMNS};

/// BLAKE3 digest identifying a table's structure and content
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Summary of a numeric column
#[derive(Clone, Debug, PartialEq)]
pub struct NumericStats {
    pub column: &'static str,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Applicant table with its header row
#[derive(Clone, Debug)]
pub struct Dataset {
    headers: Vec<String>,
    /// Cell text per row, aligned with `headers`
    rows: Vec<Vec<String>>,
    records: Vec<ApplicantRecord>,
}

impl Dataset {
    /// Load the table from a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DatasetError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;

        let dataset = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            rows = dataset.len(),
            columns = dataset.column_count(),
            "loaded applicant dataset"
        );
        Ok(dataset)
    }

    /// Load the table from any reader producing comma-delimited CSV
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let header_record = reader.headers().map_err(DatasetError::Header)?.clone();
        let headers: Vec<String> = header_record.iter().map(str::to_string).collect();

        let missing: Vec<String> = SCHEMA_COLUMNS
            .iter()
            .filter(|column| !headers.iter().any(|h| h == *column))
            .map(|column| column.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DatasetError::Schema { missing });
        }

        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut records = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record_error = |source: csv::Error| DatasetError::Record {
                row: idx + 1,
                source,
            };
            let raw = result.map_err(record_error)?;
            let record: ApplicantRecord = raw
                .deserialize(Some(&header_record))
                .map_err(record_error)?;
            rows.push(raw.iter().map(str::to_string).collect());
            records.push(record);
        }

        if records.is_empty() {
            return Err(DatasetError::Empty);
        }

        debug!(headers = ?headers, "dataset header accepted");
        Ok(Self {
            headers,
            rows,
            records,
        })
    }

    /// Build a table from in-memory records using the canonical header
    pub fn from_records(records: Vec<ApplicantRecord>) -> Result<Self, DatasetError> {
        if records.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(Self {
            headers: SCHEMA_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: records.iter().map(|r| r.cells().to_vec()).collect(),
            records,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Cell text of every row in header order, extra columns included
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn records(&self) -> &[ApplicantRecord] {
        &self.records
    }

    /// Target labels in row order
    pub fn labels(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.label()).collect()
    }

    /// Get number of rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Column count without the target column
    pub fn feature_count(&self) -> usize {
        self.column_count().saturating_sub(1)
    }

    /// Frequency of every target label, ordered by label
    pub fn label_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.label().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Min, max and mean of the numeric feature columns
    pub fn numeric_stats(&self) -> Vec<NumericStats> {
        let columns: [(&'static str, fn(&ApplicantRecord) -> f64); 2] = [
            (COL_IPK, |r| r.ipk),
            (COL_JUMLAH_TANGGUNGAN, |r| r.jumlah_tanggungan as f64),
        ];

        columns
            .iter()
            .map(|(column, value)| {
                let mut min = f64::INFINITY;
                let mut max = f64::NEG_INFINITY;
                let mut sum = 0.0;
                for record in &self.records {
                    let v = value(record);
                    min = min.min(v);
                    max = max.max(v);
                    sum += v;
                }
                NumericStats {
                    column: *column,
                    min,
                    max,
                    mean: sum / self.records.len() as f64,
                }
            })
            .collect()
    }

    /// Digest over the header and every row in order
    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = blake3::Hasher::new();

        hasher.update(&(self.headers.len() as u64).to_le_bytes());
        for header in &self.headers {
            hash_str(&mut hasher, header);
        }

        hasher.update(&(self.records.len() as u64).to_le_bytes());
        for record in &self.records {
            hasher.update(&record.ipk.to_bits().to_le_bytes());
            hash_str(&mut hasher, &record.penghasilan_ortu);
            hasher.update(&record.jumlah_tanggungan.to_le_bytes());
            hash_str(&mut hasher, &record.organisasi);
            hash_str(&mut hasher, &record.prestasi);
            hash_str(&mut hasher, &record.kelayakan_beasiswa);
        }

        Fingerprint(*hasher.finalize().as_bytes())
    }
}

fn hash_str(hasher: &mut blake3::Hasher, value: &str) {
    hasher.update(&(value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}
