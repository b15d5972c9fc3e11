//! Batch scoring: drives the prediction client across a dataset.
//!
//! Scoring is pure relative to the filesystem; persistence lives in the
//! publisher. Per row: encode, predict, join with ground truth, append.

use crate::client::{PredictService, FALSE_CLASS_INDEX, TRUE_CLASS_INDEX};
use crate::dataset::Dataset;
use crate::encoder;
use crate::error::PredictionError;
use crate::metrics::ScoringMetrics;
use crate::types::result_table::{ResultTable, ScoredRow};
use crate::types::transaction::TransactionRecord;
use futures::stream::{self, StreamExt};
use std::time::Instant;
use tracing::{debug, warn};

/// Outcome of a batch run: the accumulated table plus how many rows
/// were skipped on per-row request failures.
#[derive(Debug)]
pub struct ScoringOutcome {
    pub table: ResultTable,
    pub skipped: usize,
}

/// Drives predictions across a dataset, in input order.
pub struct BatchScorer {
    /// Maximum in-flight requests; 1 = strictly sequential.
    concurrency: usize,
}

impl BatchScorer {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    /// Score every row of the dataset. Rows whose prediction fails with
    /// a connection, timeout, or protocol error are logged and skipped;
    /// the run itself keeps going. Output rows land in dataset order
    /// regardless of request completion order, and one row's failure
    /// never cancels the others.
    pub async fn run<C: PredictService>(
        &self,
        dataset: &Dataset,
        client: &C,
        metrics: &ScoringMetrics,
    ) -> ScoringOutcome {
        let mut table = ResultTable::new(dataset.feature_columns());
        let mut skipped = 0usize;

        let results: Vec<_> = stream::iter(dataset.records().iter().enumerate())
            .map(|(index, record)| async move {
                let started = Instant::now();
                let outcome = score_row(record, client).await;
                (index, record, outcome, started.elapsed())
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        for (index, record, outcome, elapsed) in results {
            match outcome {
                Ok(row) => {
                    debug!(
                        row = %record.display_id(index),
                        predicted = %row.predicted_label,
                        elapsed_us = elapsed.as_micros() as u64,
                        "row scored"
                    );
                    metrics.record_scored(elapsed);
                    table.push(row);
                }
                Err(e) => {
                    warn!(
                        row = %record.display_id(index),
                        error = %e,
                        "prediction failed, skipping row"
                    );
                    metrics.record_skipped();
                    skipped += 1;
                }
            }
        }

        ScoringOutcome { table, skipped }
    }
}

/// Score one row against the serving endpoint: encode the feature
/// vector, issue the request, and join the response with the row's
/// ground truth.
pub async fn score_row<C: PredictService>(
    record: &TransactionRecord,
    client: &C,
) -> Result<ScoredRow, PredictionError> {
    let payload = encoder::encode(&record.features);
    let prediction = client.predict(&payload).await?;

    let confidence_false = *prediction
        .scores
        .get(FALSE_CLASS_INDEX)
        .ok_or_else(|| PredictionError::Protocol("missing negative-class score".to_string()))?;
    let confidence_true = *prediction
        .scores
        .get(TRUE_CLASS_INDEX)
        .ok_or_else(|| PredictionError::Protocol("missing positive-class score".to_string()))?;

    Ok(ScoredRow {
        features: record.features.clone(),
        ground_truth: record.label.clone(),
        predicted_label: prediction.label,
        predicted_is_true: confidence_false < confidence_true,
        confidence_false,
        confidence_true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Prediction;
    use async_trait::async_trait;

    struct FixedPredictor {
        scores: Vec<f64>,
    }

    #[async_trait]
    impl PredictService for FixedPredictor {
        async fn predict(&self, _payload: &str) -> Result<Prediction, PredictionError> {
            Ok(Prediction {
                label: "1".to_string(),
                scores: self.scores.clone(),
            })
        }
    }

    #[tokio::test]
    async fn test_flag_follows_class_index_contract() {
        let record = TransactionRecord::new(vec![1.0]).with_label("1".to_string());

        let predictor = FixedPredictor {
            scores: vec![0.2, 0.8],
        };
        let row = score_row(&record, &predictor).await.unwrap();
        assert!(row.predicted_is_true);
        assert_eq!(row.confidence_false, 0.2);
        assert_eq!(row.confidence_true, 0.8);

        let predictor = FixedPredictor {
            scores: vec![0.9, 0.1],
        };
        let row = score_row(&record, &predictor).await.unwrap();
        assert!(!row.predicted_is_true);
    }

    #[tokio::test]
    async fn test_short_score_vector_is_protocol_error() {
        let record = TransactionRecord::new(vec![1.0]);
        let predictor = FixedPredictor { scores: vec![0.9] };

        let err = score_row(&record, &predictor).await.unwrap_err();
        assert!(matches!(err, PredictionError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_ground_truth_joined_onto_row() {
        let record = TransactionRecord::new(vec![1.0, 2.0]).with_label("0".to_string());
        let predictor = FixedPredictor {
            scores: vec![0.6, 0.4],
        };

        let row = score_row(&record, &predictor).await.unwrap();
        assert_eq!(row.ground_truth.as_deref(), Some("0"));
        assert_eq!(row.features, vec![1.0, 2.0]);
    }
}
