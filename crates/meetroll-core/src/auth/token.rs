//! Access tokens for outgoing API requests.
//!
//! The Meet client asks its token source for a bearer token before every
//! request, so a long polling run keeps working after the access token
//! obtained at startup expires.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use super::credential::Credential;
use super::oauth::OAuthClient;
use super::AuthError;

/// Supplies the bearer token attached to each API request.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, AuthError>;
}

/// A fixed token, for callers that manage expiry themselves.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl AccessTokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, AuthError> {
        Ok(self.0.clone())
    }
}

/// Credential that refreshes itself in place when its access token is
/// about to expire, optionally writing the result back to the token file.
pub struct RefreshingCredential {
    credential: Mutex<Credential>,
    oauth: OAuthClient,
    token_file: Option<PathBuf>,
}

impl RefreshingCredential {
    pub fn new(credential: Credential, oauth: OAuthClient) -> Self {
        Self {
            credential: Mutex::new(credential),
            oauth,
            token_file: None,
        }
    }

    /// Save every refreshed credential to `path`
    pub fn persist_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = Some(path.into());
        self
    }

    /// Snapshot of the current credential
    pub async fn credential(&self) -> Credential {
        self.credential.lock().await.clone()
    }
}

#[async_trait]
impl AccessTokenSource for RefreshingCredential {
    async fn access_token(&self) -> Result<String, AuthError> {
        // Held across the refresh so concurrent requests refresh only once
        let mut credential = self.credential.lock().await;

        if !credential.is_valid() {
            if !credential.can_refresh() {
                return Err(AuthError::NotRefreshable);
            }
            info!("Access token expired, refreshing");
            self.oauth.refresh(&mut credential).await?;
            if let Some(ref path) = self.token_file {
                credential.save(path)?;
            }
        }

        credential
            .access_token()
            .map(str::to_string)
            .ok_or(AuthError::NotRefreshable)
    }
}
