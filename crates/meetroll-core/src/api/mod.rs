//! REST API client module for Google Meet.
//!
//! This module provides the `MeetClient` for communicating with the Meet
//! REST API to manage spaces and read conference records and participants.
//!
//! The API uses OAuth2 bearer token authentication; tokens come from
//! [`crate::auth`].

pub mod client;
pub mod error;
pub mod pagination;

pub use client::{MeetClient, DEFAULT_API_BASE_URL};
pub use error::DirectoryError;
pub use pagination::{paginate, Page};
