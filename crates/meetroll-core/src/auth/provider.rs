use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Url;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use super::callback::wait_for_code;
use super::credential::Credential;
use super::oauth::{authorization_url, random_state, OAuthClient};
use super::secrets::ClientSecrets;
use super::token::RefreshingCredential;
use super::AuthError;

/// How long the consent flow waits for the browser redirect
const AUTHORIZATION_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Shows the consent URL to the user
type Prompt = Box<dyn Fn(&Url) + Send + Sync>;

fn print_prompt(url: &Url) {
    println!("Please visit this URL to authorize this application: {}", url);
}

/// Supplies a credential that is valid right now.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn get_valid_credential(&self) -> Result<Credential, AuthError>;
}

/// What to do with the cached credential, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialAction {
    UseCached,
    Refresh,
    Authorize,
}

impl CredentialAction {
    pub fn plan(cached: Option<&Credential>, scopes: &[String], now: DateTime<Utc>) -> Self {
        match cached {
            Some(cred) if !cred.has_scopes(scopes) => CredentialAction::Authorize,
            Some(cred) if cred.token.is_some() && !cred.is_expired_at(now) => CredentialAction::UseCached,
            Some(cred) if cred.can_refresh() => CredentialAction::Refresh,
            _ => CredentialAction::Authorize,
        }
    }
}

/// Credential provider backed by a token file, with refresh and the
/// installed-app consent flow as fallbacks.
pub struct FileCredentialProvider {
    token_file: PathBuf,
    secrets_file: PathBuf,
    scopes: Vec<String>,
    allow_interactive: bool,
    authorization_timeout: Duration,
    prompt: Prompt,
    oauth: OAuthClient,
}

impl FileCredentialProvider {
    pub fn new(
        token_file: impl Into<PathBuf>,
        secrets_file: impl Into<PathBuf>,
        scopes: Vec<String>,
    ) -> Result<Self, AuthError> {
        Ok(Self {
            token_file: token_file.into(),
            secrets_file: secrets_file.into(),
            scopes,
            allow_interactive: true,
            authorization_timeout: AUTHORIZATION_TIMEOUT,
            prompt: Box::new(print_prompt),
            oauth: OAuthClient::new()?,
        })
    }

    /// Allow or forbid falling back to the browser consent flow
    pub fn allow_interactive(mut self, allow: bool) -> Self {
        self.allow_interactive = allow;
        self
    }

    /// Replace the default stdout prompt that shows the consent URL
    pub fn with_prompt(mut self, prompt: impl Fn(&Url) + Send + Sync + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    pub fn token_file(&self) -> &Path {
        &self.token_file
    }

    /// Wrap `credential` so it refreshes itself and is saved back to the
    /// token file as requests are made.
    pub fn token_source(&self, credential: Credential) -> RefreshingCredential {
        RefreshingCredential::new(credential, self.oauth.clone()).persist_to(&self.token_file)
    }

    async fn authorize_interactively(&self) -> Result<Credential, AuthError> {
        if !self.allow_interactive || !self.secrets_file.exists() {
            return Err(AuthError::NoCredential(self.token_file.clone()));
        }
        let secrets = ClientSecrets::load(&self.secrets_file)?;

        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let redirect_uri = format!("http://localhost:{}/", listener.local_addr()?.port());
        let state = random_state();
        let url = authorization_url(&secrets, &redirect_uri, &self.scopes, &state)?;

        info!(redirect_uri = %redirect_uri, "Waiting for authorization");
        (self.prompt)(&url);

        let code = wait_for_code(listener, &state, self.authorization_timeout).await?;
        self.oauth
            .exchange_code(&secrets, &code, &redirect_uri, &self.scopes)
            .await
    }
}

#[async_trait]
impl CredentialProvider for FileCredentialProvider {
    async fn get_valid_credential(&self) -> Result<Credential, AuthError> {
        let cached = Credential::load(&self.token_file)?;

        let credential = match (CredentialAction::plan(cached.as_ref(), &self.scopes, Utc::now()), cached) {
            (CredentialAction::UseCached, Some(cred)) => {
                debug!(path = %self.token_file.display(), "Using cached credential");
                return Ok(cred);
            }
            (CredentialAction::Refresh, Some(mut cred)) => {
                info!("Refreshing expired access token");
                self.oauth.refresh(&mut cred).await?;
                cred
            }
            (_, cached) => {
                if cached.is_some() {
                    warn!("Cached credential cannot be used, requesting a new authorization");
                }
                self.authorize_interactively().await?
            }
        };

        credential.save(&self.token_file)?;
        info!(path = %self.token_file.display(), "Saved credential");
        Ok(credential)
    }
}
