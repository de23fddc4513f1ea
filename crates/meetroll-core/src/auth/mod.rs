//! Authentication module for obtaining Google OAuth2 credentials.
//!
//! This module provides:
//! - `Credential`: the token bundle, persisted as Google "authorized user" JSON
//! - `FileCredentialProvider`: load, refresh, or interactively obtain a credential
//! - The installed-app consent flow (loopback redirect on an ephemeral port)
//! - `RefreshingCredential`: refreshes the access token in place as requests go out
//!
//! The provider is consulted once at startup. After that the API client
//! draws tokens from a `RefreshingCredential`.

pub mod callback;
pub mod credential;
pub mod error;
pub mod oauth;
pub mod provider;
pub mod secrets;
pub mod token;

pub use credential::Credential;
pub use error::AuthError;
pub use provider::{CredentialAction, CredentialProvider, FileCredentialProvider};
pub use secrets::ClientSecrets;
pub use token::{AccessTokenSource, RefreshingCredential, StaticToken};
