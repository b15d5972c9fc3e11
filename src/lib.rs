//! Prediction Scoring Pipeline Library
//!
//! Client and batch scorer for a transaction-classification serving
//! endpoint: encodes anonymised transaction rows into the wire format
//! the served model expects, issues bounded-timeout prediction
//! requests, and aggregates scored rows into the artifacts the
//! pipeline orchestrator consumes.

pub mod client;
pub mod config;
pub mod dataset;
pub mod encoder;
pub mod error;
pub mod metrics;
pub mod model;
pub mod publisher;
pub mod scorer;
pub mod types;

pub use client::{get_prediction, PredictService, Prediction, PredictionClient};
pub use config::{AppConfig, ConnectionConfig, ConnectionStrategy};
pub use dataset::Dataset;
pub use error::PredictionError;
pub use metrics::ScoringMetrics;
pub use scorer::{BatchScorer, ScoringOutcome};
pub use types::{ResultTable, ScoredRow, TransactionRecord};
