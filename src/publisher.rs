//! Persists scoring artifacts for the pipeline orchestrator.
//!
//! Deterministic filenames, deterministic content: publishing the same
//! table twice produces byte-identical files.

use crate::types::result_table::ResultTable;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Output schema document.
pub const SCHEMA_FILE: &str = "schema.json";
/// Header-less row data.
pub const RESULTS_FILE: &str = "prediction_results";
/// Plain-text pointer the orchestrator reads back.
pub const STATUS_FILE: &str = "output.txt";
/// UI metadata describing the artifact as a renderable table.
pub const UI_METADATA_FILE: &str = "mlpipeline-ui-metadata.json";

/// Where the published artifacts landed.
#[derive(Debug, Clone)]
pub struct StatusDescriptor {
    pub results_path: PathBuf,
    pub schema_path: PathBuf,
    pub status_path: PathBuf,
    pub ui_metadata_path: PathBuf,
}

#[derive(Debug, Serialize)]
struct UiMetadata {
    outputs: Vec<UiOutput>,
}

#[derive(Debug, Serialize)]
struct UiOutput {
    #[serde(rename = "type")]
    output_type: &'static str,
    storage: &'static str,
    format: &'static str,
    header: Vec<String>,
    source: String,
}

/// Write the schema JSON, row data, status pointer, and UI metadata
/// under `output_dir`. The status artifact always reports the output
/// location, even when rows were skipped during scoring.
pub fn publish(output_dir: &Path, table: &ResultTable, cloud: bool) -> Result<StatusDescriptor> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("cannot create output dir {}", output_dir.display()))?;

    let schema_path = output_dir.join(SCHEMA_FILE);
    let schema_json =
        serde_json::to_string(table.schema()).context("cannot serialize output schema")?;
    fs::write(&schema_path, schema_json)
        .with_context(|| format!("cannot write {}", schema_path.display()))?;

    let results_path = output_dir.join(RESULTS_FILE);
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(&results_path)
        .with_context(|| format!("cannot write {}", results_path.display()))?;
    for row in table.rows() {
        writer
            .write_record(row.to_record())
            .context("cannot write result row")?;
    }
    writer.flush().context("cannot flush result rows")?;

    let status_path = output_dir.join(STATUS_FILE);
    fs::write(&status_path, results_path.display().to_string())
        .with_context(|| format!("cannot write {}", status_path.display()))?;

    let metadata = UiMetadata {
        outputs: vec![UiOutput {
            output_type: "table",
            storage: if cloud { "gcs" } else { "local" },
            format: "csv",
            header: table.header(),
            source: results_path.display().to_string(),
        }],
    };
    let ui_metadata_path = output_dir.join(UI_METADATA_FILE);
    fs::write(
        &ui_metadata_path,
        serde_json::to_string(&metadata).context("cannot serialize ui metadata")?,
    )
    .with_context(|| format!("cannot write {}", ui_metadata_path.display()))?;

    info!(
        results = %results_path.display(),
        rows = table.len(),
        "published scoring artifacts"
    );

    Ok(StatusDescriptor {
        results_path,
        schema_path,
        status_path,
        ui_metadata_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::result_table::ScoredRow;
    use serde_json::Value;

    fn sample_table() -> ResultTable {
        let mut table = ResultTable::new(&["var_0".to_string(), "var_1".to_string()]);
        table.push(ScoredRow {
            features: vec![1.0, 2.0],
            ground_truth: Some("0".to_string()),
            predicted_label: "0".to_string(),
            predicted_is_true: false,
            confidence_false: 0.9,
            confidence_true: 0.1,
        });
        table.push(ScoredRow {
            features: vec![3.0, 4.0],
            ground_truth: Some("1".to_string()),
            predicted_label: "1".to_string(),
            predicted_is_true: true,
            confidence_false: 0.2,
            confidence_true: 0.8,
        });
        table
    }

    #[test]
    fn test_publish_writes_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let table = sample_table();

        let status = publish(dir.path(), &table, false).unwrap();

        let schema: Value =
            serde_json::from_str(&fs::read_to_string(&status.schema_path).unwrap()).unwrap();
        assert_eq!(schema.as_array().unwrap().len(), 6);
        assert_eq!(schema[0]["name"], "var_0");
        assert_eq!(schema[0]["type"], "NUMBER");
        assert_eq!(schema[3]["name"], "predicted");
        assert_eq!(schema[3]["type"], "CATEGORY");

        let rows = fs::read_to_string(&status.results_path).unwrap();
        let lines: Vec<&str> = rows.lines().collect();
        assert_eq!(lines, vec!["1,2,0,false,0.9,0.1", "3,4,1,true,0.2,0.8"]);

        let pointer = fs::read_to_string(&status.status_path).unwrap();
        assert_eq!(pointer, status.results_path.display().to_string());

        let metadata: Value =
            serde_json::from_str(&fs::read_to_string(&status.ui_metadata_path).unwrap()).unwrap();
        let output = &metadata["outputs"][0];
        assert_eq!(output["type"], "table");
        assert_eq!(output["storage"], "local");
        assert_eq!(output["format"], "csv");
        assert_eq!(output["header"][2], "target");
        assert_eq!(output["source"], status.results_path.display().to_string());
    }

    #[test]
    fn test_publish_is_byte_identical_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let table = sample_table();

        publish(dir.path(), &table, false).unwrap();
        let first = fs::read(dir.path().join(RESULTS_FILE)).unwrap();
        let first_schema = fs::read(dir.path().join(SCHEMA_FILE)).unwrap();

        publish(dir.path(), &table, false).unwrap();
        assert_eq!(fs::read(dir.path().join(RESULTS_FILE)).unwrap(), first);
        assert_eq!(fs::read(dir.path().join(SCHEMA_FILE)).unwrap(), first_schema);
    }

    #[test]
    fn test_empty_table_publishes_valid_schema() {
        let dir = tempfile::tempdir().unwrap();
        let table = ResultTable::new(&["var_0".to_string()]);

        let status = publish(dir.path(), &table, false).unwrap();

        assert_eq!(fs::read_to_string(&status.results_path).unwrap(), "");
        let schema: Value =
            serde_json::from_str(&fs::read_to_string(&status.schema_path).unwrap()).unwrap();
        assert_eq!(schema.as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_cloud_mode_sets_gcs_storage() {
        let dir = tempfile::tempdir().unwrap();
        let status = publish(dir.path(), &sample_table(), true).unwrap();

        let metadata: Value =
            serde_json::from_str(&fs::read_to_string(&status.ui_metadata_path).unwrap()).unwrap();
        assert_eq!(metadata["outputs"][0]["storage"], "gcs");
    }
}
