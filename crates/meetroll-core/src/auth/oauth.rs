//! Token endpoint calls and authorization URL construction.

use std::time::Duration;

use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use super::credential::{Credential, TokenResponse};
use super::secrets::ClientSecrets;
use super::AuthError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Length of the random `state` parameter
const STATE_LENGTH: usize = 30;

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Random value echoed back by the authorization server to tie the
/// callback to this request.
pub fn random_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}

/// Build the consent URL for the installed-app flow. Offline access is
/// requested so the grant comes with a refresh token.
pub fn authorization_url(
    secrets: &ClientSecrets,
    redirect_uri: &str,
    scopes: &[String],
    state: &str,
) -> Result<Url, AuthError> {
    let scope = scopes.join(" ");
    Url::parse_with_params(
        &secrets.auth_uri,
        &[
            ("response_type", "code"),
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("scope", scope.as_str()),
            ("state", state),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )
    .map_err(|e| AuthError::InvalidAuthUri(format!("{} ({})", secrets.auth_uri, e)))
}

/// Client for the OAuth2 token endpoint.
#[derive(Clone)]
pub struct OAuthClient {
    http: Client,
}

impl OAuthClient {
    pub fn new() -> Result<Self, AuthError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { http })
    }

    async fn token_request(&self, token_uri: &str, form: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let response = self.http.post(token_uri).form(form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) => format!("status {}", status),
            };
            return Err(AuthError::TokenEndpoint(message));
        }

        serde_json::from_str(&body)
            .map_err(|e| AuthError::TokenEndpoint(format!("unparsable token response: {}", e)))
    }

    /// Exchange the refresh token for a new access token, updating `credential` in place.
    pub async fn refresh(&self, credential: &mut Credential) -> Result<(), AuthError> {
        let refresh_token = credential
            .refresh_token
            .clone()
            .ok_or_else(|| AuthError::TokenEndpoint("credential has no refresh token".to_string()))?;

        let response = self
            .token_request(
                &credential.token_uri,
                &[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token.as_str()),
                    ("client_id", credential.client_id.as_str()),
                    ("client_secret", credential.client_secret.as_str()),
                ],
            )
            .await?;

        debug!(expires_in = ?response.expires_in, "Access token refreshed");
        credential.apply_token_response(response, Utc::now());
        Ok(())
    }

    /// Trade an authorization code for a new credential.
    pub async fn exchange_code(
        &self,
        secrets: &ClientSecrets,
        code: &str,
        redirect_uri: &str,
        scopes: &[String],
    ) -> Result<Credential, AuthError> {
        let response = self
            .token_request(
                &secrets.token_uri,
                &[
                    ("grant_type", "authorization_code"),
                    ("code", code),
                    ("redirect_uri", redirect_uri),
                    ("client_id", secrets.client_id.as_str()),
                    ("client_secret", secrets.client_secret.as_str()),
                ],
            )
            .await?;

        let mut credential = Credential {
            token: None,
            refresh_token: None,
            token_uri: secrets.token_uri.clone(),
            client_id: secrets.client_id.clone(),
            client_secret: secrets.client_secret.clone(),
            scopes: scopes.to_vec(),
            expiry: None,
        };
        credential.apply_token_response(response, Utc::now());
        Ok(credential)
    }
}
