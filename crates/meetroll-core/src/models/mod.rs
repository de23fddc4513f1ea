//! Data models for Google Meet entities.
//!
//! This module contains the structures used to represent Meet data:
//!
//! - `Space`: a persistent meeting identity (URL + code)
//! - `ConferenceRecord`: one session held in a space, active until it has an end time
//! - `ParticipantRecord`, `Participant`: raw and classified attendees
//! - `ParticipantRoster`: the attendance document written to disk

pub mod conference;
pub mod participant;

pub use conference::{ConferenceRecord, Space};
pub use participant::{
    AnonymousUser, Participant, ParticipantKind, ParticipantRecord, ParticipantRoster, PhoneUser,
    SignedinUser,
};
