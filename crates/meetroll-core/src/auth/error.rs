use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No valid credential in {0} and interactive authorization is unavailable")]
    NoCredential(PathBuf),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Client secrets file {0} has neither an \"installed\" nor a \"web\" section")]
    InvalidSecrets(PathBuf),

    #[error("Invalid authorization URI: {0}")]
    InvalidAuthUri(String),

    #[error("Token endpoint rejected the request: {0}")]
    TokenEndpoint(String),

    #[error("Authorization was denied: {0}")]
    Denied(String),

    #[error("OAuth state mismatch in authorization callback")]
    StateMismatch,

    #[error("No authorization redirect received within {0:?}")]
    CallbackTimeout(Duration),

    #[error("Authorization callback server stopped before a redirect arrived")]
    CallbackClosed,

    #[error("Access token expired and the credential has no refresh token")]
    NotRefreshable,

    #[error("Authorization callback listener failed: {0}")]
    Listener(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}
