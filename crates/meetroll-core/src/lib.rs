//! Core library for meetroll.
//!
//! Polls Google Meet for the conference that is currently running and
//! records who is in it:
//!
//! - `auth`: OAuth2 credentials (token file, refresh, consent flow)
//! - `api`: Meet REST client with lazy pagination
//! - `directory`: active-conference lookup and participant classification
//! - `attendance`: timestamped attendance files
//! - `poller`: the cancellable polling loop
//! - `config`: file and environment configuration

pub mod api;
pub mod attendance;
pub mod auth;
pub mod config;
pub mod directory;
pub mod models;
pub mod poller;

pub use api::{DirectoryError, MeetClient};
pub use attendance::AttendanceRecorder;
pub use auth::{
    AccessTokenSource, AuthError, Credential, CredentialProvider, FileCredentialProvider,
    RefreshingCredential,
};
pub use config::Config;
pub use directory::{ConferenceDirectory, ParticipantReader};
pub use poller::{AttendancePoller, CycleOutcome, PollSummary};
