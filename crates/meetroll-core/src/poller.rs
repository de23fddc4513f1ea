//! The attendance polling loop.
//!
//! Each cycle looks up the active conference, and if there is one, reads
//! its participants and writes an attendance file. Between cycles the loop
//! waits on a timer that the cancellation token can cut short. Every error
//! ends the run; only "no active meeting" is an expected outcome.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::attendance::AttendanceRecorder;
use crate::config::DEFAULT_POLL_INTERVAL_SECS;
use crate::directory::{ConferenceDirectory, ParticipantReader};

/// Result of a single poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    NoActiveConference,
    Recorded {
        conference: String,
        path: PathBuf,
        signed_in: usize,
        anonymous: usize,
    },
}

/// What a finished run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub cycles: u32,
    pub snapshots: u32,
    pub cancelled: bool,
}

pub struct AttendancePoller<D, P> {
    directory: D,
    participants: P,
    recorder: AttendanceRecorder,
    interval: Duration,
    max_cycles: Option<u32>,
}

impl<D, P> AttendancePoller<D, P>
where
    D: ConferenceDirectory,
    P: ParticipantReader,
{
    pub fn new(directory: D, participants: P, recorder: AttendanceRecorder) -> Self {
        Self {
            directory,
            participants,
            recorder,
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_cycles: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Bound the number of cycles; `None` runs until cancelled
    pub fn with_max_cycles(mut self, max_cycles: Option<u32>) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    fn reached_limit(&self, cycles: u32) -> bool {
        self.max_cycles.is_some_and(|max| cycles >= max)
    }

    /// Check once for an active conference and record its attendance.
    pub async fn poll_once(&self) -> Result<CycleOutcome> {
        let conference = match self
            .directory
            .list_active_conference()
            .await
            .context("Failed to list conference records")?
        {
            Some(conference) => conference,
            None => {
                info!("No active meeting right now");
                return Ok(CycleOutcome::NoActiveConference);
            }
        };

        let roster = self
            .participants
            .list_participants(&conference.name)
            .await
            .with_context(|| format!("Failed to list participants of {}", conference.name))?;
        let path = self.recorder.save(&roster)?;

        info!(
            conference = %conference.name,
            signed_in = roster.signed_users.len(),
            anonymous = roster.anonymous_users.len(),
            path = %path.display(),
            "Attendance saved"
        );

        Ok(CycleOutcome::Recorded {
            conference: conference.name,
            path,
            signed_in: roster.signed_users.len(),
            anonymous: roster.anonymous_users.len(),
        })
    }

    /// Poll until the cycle limit is reached or `cancel` fires. A cycle in
    /// progress always completes; there is no sleep after the last cycle.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<PollSummary> {
        let mut summary = PollSummary::default();

        loop {
            if self.reached_limit(summary.cycles) {
                break;
            }
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            info!(cycle = summary.cycles + 1, "Checking attendance");
            if let CycleOutcome::Recorded { .. } = self.poll_once().await? {
                summary.snapshots += 1;
            }
            summary.cycles += 1;

            if self.reached_limit(summary.cycles) {
                break;
            }

            debug!(secs = self.interval.as_secs(), "Waiting for the next check");
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = cancel.cancelled() => {
                    summary.cancelled = true;
                    break;
                }
            }
        }

        info!(
            cycles = summary.cycles,
            snapshots = summary.snapshots,
            cancelled = summary.cancelled,
            "Polling finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::api::DirectoryError;
    use crate::models::{ConferenceRecord, ParticipantRoster};

    #[derive(Default)]
    struct StubDirectory {
        active: Option<ConferenceRecord>,
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl ConferenceDirectory for StubDirectory {
        async fn list_active_conference(&self) -> Result<Option<ConferenceRecord>, DirectoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DirectoryError::Unauthorized);
            }
            Ok(self.active.clone())
        }
    }

    #[derive(Default)]
    struct StubReader {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ParticipantReader for StubReader {
        async fn list_participants(&self, conference: &str) -> Result<ParticipantRoster, DirectoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ParticipantRoster {
                parent_name: conference.to_string(),
                signed_users: vec!["Ada".to_string()],
                anonymous_users: vec!["Guest".to_string(), "Guest".to_string()],
            })
        }
    }

    fn live_conference() -> ConferenceRecord {
        ConferenceRecord {
            name: "conferenceRecords/live".to_string(),
            space: Some("spaces/s".to_string()),
            start_time: None,
            end_time: None,
            expire_time: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_meeting_never_reads_or_writes() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("attendance");
        let directory_calls = Arc::new(AtomicUsize::new(0));
        let reader_calls = Arc::new(AtomicUsize::new(0));

        let poller = AttendancePoller::new(
            StubDirectory {
                calls: directory_calls.clone(),
                ..Default::default()
            },
            StubReader {
                calls: reader_calls.clone(),
            },
            AttendanceRecorder::new(&output),
        )
        .with_max_cycles(Some(3));

        let summary = poller.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(
            summary,
            PollSummary {
                cycles: 3,
                snapshots: 0,
                cancelled: false
            }
        );
        assert_eq!(directory_calls.load(Ordering::SeqCst), 3);
        assert_eq!(reader_calls.load(Ordering::SeqCst), 0);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_poll_once_records_active_conference() {
        let dir = tempfile::tempdir().unwrap();
        let poller = AttendancePoller::new(
            StubDirectory {
                active: Some(live_conference()),
                ..Default::default()
            },
            StubReader::default(),
            AttendanceRecorder::new(dir.path()),
        );

        match poller.poll_once().await.unwrap() {
            CycleOutcome::Recorded {
                conference,
                path,
                signed_in,
                anonymous,
            } => {
                assert_eq!(conference, "conferenceRecords/live");
                assert_eq!((signed_in, anonymous), (1, 2));
                let saved = crate::attendance::load_snapshot(&path).unwrap();
                assert_eq!(saved.parent_name, "conferenceRecords/live");
                assert_eq!(saved.anonymous_users, vec!["Guest", "Guest"]);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_separates_cycles() {
        let dir = tempfile::tempdir().unwrap();
        let poller = AttendancePoller::new(
            StubDirectory::default(),
            StubReader::default(),
            AttendanceRecorder::new(dir.path()),
        )
        .with_interval(Duration::from_secs(1800))
        .with_max_cycles(Some(3));

        let start = tokio::time::Instant::now();
        poller.run(&CancellationToken::new()).await.unwrap();

        // Two waits between three cycles, none after the last
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(3600));
        assert!(elapsed < Duration::from_secs(5400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_sleep_stops_loop() {
        let dir = tempfile::tempdir().unwrap();
        let directory_calls = Arc::new(AtomicUsize::new(0));
        let poller = AttendancePoller::new(
            StubDirectory {
                calls: directory_calls.clone(),
                ..Default::default()
            },
            StubReader::default(),
            AttendanceRecorder::new(dir.path()),
        );

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            trigger.cancel();
        });

        let start = tokio::time::Instant::now();
        let summary = poller.run(&cancel).await.unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.cycles, 1);
        assert_eq!(directory_calls.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() < Duration::from_secs(1800));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let directory_calls = Arc::new(AtomicUsize::new(0));
        let poller = AttendancePoller::new(
            StubDirectory {
                calls: directory_calls.clone(),
                ..Default::default()
            },
            StubReader::default(),
            AttendanceRecorder::new(dir.path()),
        );

        let cancel = CancellationToken::new();
        cancel.cancel();
        let summary = poller.run(&cancel).await.unwrap();

        assert_eq!(summary.cycles, 0);
        assert!(summary.cancelled);
        assert_eq!(directory_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_directory_error_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let reader_calls = Arc::new(AtomicUsize::new(0));
        let poller = AttendancePoller::new(
            StubDirectory {
                fail: true,
                ..Default::default()
            },
            StubReader {
                calls: reader_calls.clone(),
            },
            AttendanceRecorder::new(dir.path()),
        );

        let err = poller.run(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DirectoryError>(),
            Some(DirectoryError::Unauthorized)
        ));
        assert_eq!(reader_calls.load(Ordering::SeqCst), 0);
    }
}
