use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing::debug;

use crate::models::ParticipantRoster;

/// Prefix of every attendance file name
const FILE_PREFIX: &str = "attendance";

/// Second-resolution label used in file names
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// `attendance-YYYYMMDD_HHMMSS.json` for the given capture time
pub fn snapshot_file_name(captured_at: DateTime<Local>) -> String {
    format!("{}-{}.json", FILE_PREFIX, captured_at.format(TIMESTAMP_FORMAT))
}

/// Write `roster` into `output_dir`, named after the current local time.
pub fn save_snapshot(roster: &ParticipantRoster, output_dir: &Path) -> Result<PathBuf> {
    save_snapshot_at(roster, output_dir, Local::now())
}

/// Write `roster` into `output_dir`, creating the directory if needed.
/// A second snapshot captured within the same second replaces the first.
pub fn save_snapshot_at(
    roster: &ParticipantRoster,
    output_dir: &Path,
    captured_at: DateTime<Local>,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let path = output_dir.join(snapshot_file_name(captured_at));
    let contents = serde_json::to_string(roster)?;
    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write attendance file {}", path.display()))?;

    debug!(path = %path.display(), "Attendance snapshot written");
    Ok(path)
}

/// Read a previously written attendance file
pub fn load_snapshot(path: &Path) -> Result<ParticipantRoster> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read attendance file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse attendance file {}", path.display()))
}

/// Writes snapshots into one output directory.
#[derive(Debug, Clone)]
pub struct AttendanceRecorder {
    output_dir: PathBuf,
}

impl AttendanceRecorder {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn save(&self, roster: &ParticipantRoster) -> Result<PathBuf> {
        save_snapshot(roster, &self.output_dir)
    }
}

// ============================================================================
// Tests
// ============================================================================
