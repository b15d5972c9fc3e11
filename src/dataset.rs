//! Tabular dataset loading for batch scoring.
//!
//! Splits the identifier and target columns out of the feature matrix so
//! the encoder only ever sees feature values, in source column order.

use crate::error::PredictionError;
use crate::types::transaction::TransactionRecord;
use csv::ReaderBuilder;
use std::path::Path;
use tracing::info;

/// Identifier column of the anonymised transaction dataset.
pub const DEFAULT_ID_COLUMN: &str = "ID_code";
/// Ground-truth column of the anonymised transaction dataset.
pub const DEFAULT_TARGET_COLUMN: &str = "target";

/// A loaded dataset: feature column names plus one record per data row,
/// in file order.
#[derive(Debug, Clone)]
pub struct Dataset {
    feature_columns: Vec<String>,
    records: Vec<TransactionRecord>,
}

impl Dataset {
    /// Read a headered CSV file, excluding the identifier and label
    /// columns from the feature matrix. Either column may be absent.
    ///
    /// An unreadable file, a missing header, or a non-numeric feature
    /// cell is a `DataSource` error; a file with headers but no data
    /// rows loads as an empty dataset.
    pub fn from_csv<P: AsRef<Path>>(
        path: P,
        id_column: &str,
        label_column: &str,
    ) -> Result<Self, PredictionError> {
        let path = path.as_ref();

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| {
                PredictionError::DataSource(format!("cannot read {}: {e}", path.display()))
            })?;

        let headers = reader
            .headers()
            .map_err(|e| {
                PredictionError::DataSource(format!("cannot read header of {}: {e}", path.display()))
            })?
            .clone();

        let id_index = headers.iter().position(|h| h == id_column);
        let label_index = headers.iter().position(|h| h == label_column);

        let feature_columns: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != id_index && Some(*i) != label_index)
            .map(|(_, name)| name.to_string())
            .collect();

        if feature_columns.is_empty() {
            return Err(PredictionError::DataSource(format!(
                "{} has no feature columns",
                path.display()
            )));
        }

        let mut records = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                PredictionError::DataSource(format!("bad row {} in {}: {e}", row, path.display()))
            })?;

            let mut features = Vec::with_capacity(feature_columns.len());
            for (i, cell) in record.iter().enumerate() {
                if Some(i) == id_index || Some(i) == label_index {
                    continue;
                }
                let value: f64 = cell.parse().map_err(|_| {
                    PredictionError::DataSource(format!(
                        "row {} of {}: non-numeric feature value {:?}",
                        row,
                        path.display(),
                        cell
                    ))
                })?;
                features.push(value);
            }

            let mut transaction = TransactionRecord::new(features);
            if let Some(i) = id_index {
                if let Some(id) = record.get(i) {
                    transaction = transaction.with_id(id.to_string());
                }
            }
            if let Some(i) = label_index {
                if let Some(label) = record.get(i) {
                    transaction = transaction.with_label(label.to_string());
                }
            }
            records.push(transaction);
        }

        info!(
            path = %path.display(),
            rows = records.len(),
            features = feature_columns.len(),
            "dataset loaded"
        );

        Ok(Self {
            feature_columns,
            records,
        })
    }

    /// Feature column names, in source order.
    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    /// Data rows, in file order.
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
