//! Attendance files.
//!
//! Each poll that finds an active conference writes one JSON document to
//! `<output_dir>/attendance-<YYYYMMDD_HHMMSS>.json`. Files are never
//! rewritten or removed afterwards.

pub mod recorder;

pub use recorder::{load_snapshot, save_snapshot, save_snapshot_at, snapshot_file_name, AttendanceRecorder};
