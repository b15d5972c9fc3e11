//! Wire-format encoding of transaction rows.
//!
//! The serving signature accepts a single string tensor holding one
//! CSV-encoded row, so encoding is a comma join of the feature values.

use crate::config::SamplingConfig;
use crate::dataset::{Dataset, DEFAULT_ID_COLUMN, DEFAULT_TARGET_COLUMN};
use crate::error::PredictionError;
use rand::Rng;

/// Join a feature vector into the single string payload the serving
/// signature accepts. Column order is preserved exactly; no coercion
/// beyond string conversion.
pub fn encode(features: &[f64]) -> String {
    features
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Pick one row uniformly at random from the index range
/// `0..=max_index` (clamped to the dataset length), returning the
/// encoded payload plus the excluded ground-truth label.
pub fn sample_row(
    dataset: &Dataset,
    max_index: usize,
) -> Result<(String, Option<String>), PredictionError> {
    if dataset.is_empty() {
        return Err(PredictionError::DataSource(
            "cannot sample from an empty dataset".to_string(),
        ));
    }

    let bound = dataset.len().min(max_index + 1);
    let index = rand::thread_rng().gen_range(0..bound);
    let record = dataset.records().get(index).ok_or_else(|| {
        PredictionError::DataSource(format!("sampled index {index} out of range"))
    })?;

    Ok((encode(&record.features), record.label.clone()))
}

/// Demo helper for the web front-end: load the configured test file and
/// return one random encoded transaction with its ground-truth label.
pub fn random_transaction(
    config: &SamplingConfig,
) -> Result<(String, Option<String>), PredictionError> {
    let dataset = Dataset::from_csv(&config.data_path, DEFAULT_ID_COLUMN, DEFAULT_TARGET_COLUMN)?;
    sample_row(&dataset, config.max_index)
}
