//! Stratified train/test partitioning
//!
//! Each class contributes to the test partition in proportion to its size,
//! so both partitions keep the class ratio of the full table.

use tracing::debug;

use crate::deterministic::LcgRng;
use crate::errors::TrainerError;

/// Row indices of the two partitions
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split row indices into train/test partitions stratified by class.
///
/// `targets` holds class indices into `classes`. The test partition gets
/// `ceil(test_size * n)` rows; per-class quotas use largest remainders.
pub fn stratified_split(
    targets: &[usize],
    classes: &[String],
    test_size: f64,
    seed: u64,
) -> Result<TrainTestSplit, TrainerError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(TrainerError::InvalidSplit(format!(
            "test_size must lie in (0, 1), got {test_size}"
        )));
    }

    let n = targets.len();
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); classes.len()];
    for (row, &class) in targets.iter().enumerate() {
        members[class].push(row);
    }

    let present = members.iter().filter(|m| !m.is_empty()).count();
    if present < 2 {
        return Err(TrainerError::TooFewClasses { found: present });
    }
    if let Some((class, m)) = members
        .iter()
        .enumerate()
        .find(|(_, m)| !m.is_empty() && m.len() < 2)
    {
        return Err(TrainerError::ClassTooSmall {
            label: classes[class].clone(),
            count: m.len(),
        });
    }

    let n_test = (test_size * n as f64).ceil() as usize;
    let n_train = n - n_test;
    if n_test < present || n_train < present {
        return Err(TrainerError::InvalidSplit(format!(
            "{n_train} train / {n_test} test rows cannot hold {present} classes"
        )));
    }

    let quotas = allocate_quotas(&members, n_test);

    let mut rng = LcgRng::new(seed);
    let mut train = Vec::with_capacity(n_train);
    let mut test = Vec::with_capacity(n_test);

    for (rows, &quota) in members.iter().zip(&quotas) {
        let mut rows = rows.clone();
        rng.shuffle(&mut rows);
        test.extend_from_slice(&rows[..quota]);
        train.extend_from_slice(&rows[quota..]);
    }

    rng.shuffle(&mut train);
    rng.shuffle(&mut test);

    debug!(train = train.len(), test = test.len(), quotas = ?quotas, "stratified split");
    Ok(TrainTestSplit { train, test })
}

/// Proportional per-class test quotas summing to `n_test`.
/// Remainders go to the largest fractional parts, then larger classes,
/// then lower class indices.
fn allocate_quotas(members: &[Vec<usize>], n_test: usize) -> Vec<usize> {
    let n: usize = members.iter().map(Vec::len).sum();

    let mut quotas = Vec::with_capacity(members.len());
    let mut remainders = Vec::with_capacity(members.len());
    for (class, rows) in members.iter().enumerate() {
        let scaled = rows.len() * n_test;
        quotas.push(scaled / n);
        remainders.push((scaled % n, rows.len(), class));
    }

    let assigned: usize = quotas.iter().sum();
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)).then(a.2.cmp(&b.2)));

    let mut left = n_test - assigned;
    for &(_, size, class) in &remainders {
        if left == 0 {
            break;
        }
        if quotas[class] < size {
            quotas[class] += 1;
            left -= 1;
        }
    }

    quotas
}
