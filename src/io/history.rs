use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::Result;

/// Directory name, relative to the source or output, that collects snapshots.
pub const HISTORY_DIR: &str = "history";

/// Returns a fresh snapshot path inside `history_dir`, creating the directory.
///
/// Names carry the minute of the build; seconds are appended when a snapshot
/// for the same minute already exists.
pub fn next_snapshot_path(history_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(history_dir)?;
    let now = Local::now();
    let candidate = history_dir.join(format!("newsletter_{}.xlsx", now.format("%Y-%m-%d_%H%M")));
    if !candidate.exists() {
        return Ok(candidate);
    }
    Ok(history_dir.join(format!(
        "newsletter_{}.xlsx",
        now.format("%Y-%m-%d_%H%M%S")
    )))
}

/// Copies the source workbook into the `history/` directory beside it.
pub fn archive_workbook(workbook: &Path) -> Result<PathBuf> {
    let parent = workbook.parent().unwrap_or_else(|| Path::new("."));
    let target = next_snapshot_path(&parent.join(HISTORY_DIR))?;
    fs::copy(workbook, &target)?;
    Ok(target)
}
