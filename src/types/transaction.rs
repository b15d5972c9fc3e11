//! Transaction records read from a tabular source.

use serde::{Deserialize, Serialize};

/// One anonymised transaction: an ordered numeric feature vector plus the
/// identifier and ground-truth label columns excluded from it.
///
/// Immutable once read; consumed once per prediction call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Record identifier, when the source carries one.
    pub id: Option<String>,

    /// Feature values in source column order.
    pub features: Vec<f64>,

    /// Ground-truth label, when the source carries one.
    pub label: Option<String>,
}

impl TransactionRecord {
    /// Create a record from a bare feature vector.
    pub fn new(features: Vec<f64>) -> Self {
        Self {
            id: None,
            features,
            label: None,
        }
    }

    /// Attach the source identifier.
    pub fn with_id(mut self, id: String) -> Self {
        self.id = Some(id);
        self
    }

    /// Attach the ground-truth label.
    pub fn with_label(mut self, label: String) -> Self {
        self.label = Some(label);
        self
    }

    /// Identifier used in logs when this row is skipped.
    pub fn display_id(&self, index: usize) -> String {
        self.id.clone().unwrap_or_else(|| format!("row-{index}"))
    }
}
