//! Locating the servable model directory.
//!
//! The trainer exports exactly one servable under
//! `{model_root}/export/export/{timestamp}`. A missing layer or an
//! empty export directory aborts the run before any row is scored.

use crate::error::PredictionError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Resolve the timestamped export directory under a trained model root.
pub fn resolve_export_dir(model_root: &Path) -> Result<PathBuf, PredictionError> {
    let export_parent = model_root.join("export").join("export");

    let mut exports: Vec<PathBuf> = fs::read_dir(&export_parent)
        .map_err(|e| {
            PredictionError::ModelLoad(format!(
                "cannot read export directory {}: {e}",
                export_parent.display()
            ))
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();

    // Deterministic pick when several timestamped exports are present.
    exports.sort();

    let export_dir = exports.into_iter().next().ok_or_else(|| {
        PredictionError::ModelLoad(format!(
            "no exported model under {}",
            export_parent.display()
        ))
    })?;

    info!(export = %export_dir.display(), "resolved servable model directory");
    Ok(export_dir)
}
