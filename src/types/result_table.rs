//! Scored-row accumulation and the column schema describing it.

use serde::{Deserialize, Serialize};

/// Semantic type of an output column, as rendered in `schema.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Number,
    Category,
}

/// One `{name, type}` entry of the output schema document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl ColumnSchema {
    pub fn number(name: &str) -> Self {
        Self {
            name: name.to_string(),
            column_type: ColumnType::Number,
        }
    }

    pub fn category(name: &str) -> Self {
        Self {
            name: name.to_string(),
            column_type: ColumnType::Category,
        }
    }
}

/// A transaction joined with its prediction.
#[derive(Debug, Clone)]
pub struct ScoredRow {
    /// Original feature values, source column order.
    pub features: Vec<f64>,

    /// Ground-truth label from the dataset, when present.
    pub ground_truth: Option<String>,

    /// First entry of the "classes" output tensor.
    pub predicted_label: String,

    /// Derived presentation of the prediction: negative-class score
    /// strictly below the positive-class score.
    pub predicted_is_true: bool,

    /// Confidence score of the negative class (index 0).
    pub confidence_false: f64,

    /// Confidence score of the positive class (index 1).
    pub confidence_true: f64,
}

impl ScoredRow {
    /// Cells in schema column order: features, then target, predicted,
    /// false, true. The predicted column carries the lowercase boolean
    /// presentation, matching the table renderer's expectation.
    pub fn to_record(&self) -> Vec<String> {
        let mut cells: Vec<String> = self.features.iter().map(|v| v.to_string()).collect();
        cells.push(self.ground_truth.clone().unwrap_or_default());
        cells.push(self.predicted_is_true.to_string());
        cells.push(self.confidence_false.to_string());
        cells.push(self.confidence_true.to_string());
        cells
    }
}

/// Append-only accumulation of scored rows plus the schema describing
/// their columns. Immutable once persisted.
#[derive(Debug, Clone, Default)]
pub struct ResultTable {
    schema: Vec<ColumnSchema>,
    rows: Vec<ScoredRow>,
}

impl ResultTable {
    /// Build an empty table: the dataset's feature columns as NUMBER,
    /// followed by the four fixed prediction columns.
    pub fn new(feature_columns: &[String]) -> Self {
        let mut schema: Vec<ColumnSchema> =
            feature_columns.iter().map(|c| ColumnSchema::number(c)).collect();
        schema.push(ColumnSchema::category("target"));
        schema.push(ColumnSchema::category("predicted"));
        schema.push(ColumnSchema::number("false"));
        schema.push(ColumnSchema::number("true"));

        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Append a scored row. Rows arrive in dataset order.
    pub fn push(&mut self, row: ScoredRow) {
        self.rows.push(row);
    }

    pub fn schema(&self) -> &[ColumnSchema] {
        &self.schema
    }

    pub fn rows(&self) -> &[ScoredRow] {
        &self.rows
    }

    /// Column names in schema order, for the UI metadata header.
    pub fn header(&self) -> Vec<String> {
        self.schema.iter().map(|c| c.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
