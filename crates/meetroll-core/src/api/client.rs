//! API client for the Google Meet REST API (v2).
//!
//! This module provides the `MeetClient` struct for making authenticated
//! requests against spaces, conference records and participants.

use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use reqwest::{header, Client, Method};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use crate::auth::{AccessTokenSource, StaticToken};
use crate::models::{ConferenceRecord, ParticipantRecord, Space};

use super::pagination::{paginate, Page};
use super::DirectoryError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL for the Meet REST API
pub const DEFAULT_API_BASE_URL: &str = "https://meet.googleapis.com/v2";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Items requested per page. 100 is the maximum for conference records and
/// well under the participants maximum.
const PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
struct ListConferenceRecordsResponse {
    #[serde(rename = "conferenceRecords", default)]
    conference_records: Vec<ConferenceRecord>,
    #[serde(rename = "nextPageToken", default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListParticipantsResponse {
    #[serde(default)]
    participants: Vec<ParticipantRecord>,
    #[serde(rename = "nextPageToken", default)]
    next_page_token: Option<String>,
    #[serde(rename = "totalSize", default)]
    total_size: Option<i64>,
}

/// API client for Google Meet.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling,
/// and clones share one token source.
#[derive(Clone)]
pub struct MeetClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn AccessTokenSource>,
}

impl MeetClient {
    /// Client with a fixed access token
    pub fn with_base_url(base_url: &str, token: impl Into<String>) -> Result<Self, DirectoryError> {
        Self::with_token_source(base_url, Arc::new(StaticToken::new(token)))
    }

    /// Client that asks `tokens` for a bearer token before every request
    pub fn with_token_source(
        base_url: &str,
        tokens: Arc<dyn AccessTokenSource>,
    ) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, DirectoryError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(DirectoryError::from_status(status, &body))
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, DirectoryError> {
        let url = self.url(path);
        let token = self.tokens.access_token().await?;
        debug!(%method, url = %url, "Meet API request");

        let mut request = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json")
            .query(query);
        if method == Method::POST {
            request = request.json(&serde_json::json!({}));
        }

        let response = Self::check_response(request.send().await?).await?;
        let text = response.text().await?;
        // DELETE answers with an empty body
        let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
        serde_json::from_str(text)
            .map_err(|e| DirectoryError::InvalidResponse(format!("{} from {}", e, url)))
    }

    /// Query parameters for a list call
    fn page_query(page_token: Option<String>) -> Vec<(&'static str, String)> {
        let mut query = vec![("pageSize", PAGE_SIZE.to_string())];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }
        query
    }

    // ===== Spaces =====

    pub async fn create_space(&self) -> Result<Space, DirectoryError> {
        self.send(Method::POST, "spaces", &[]).await
    }

    pub async fn delete_space(&self, space_name: &str) -> Result<(), DirectoryError> {
        let _: serde_json::Value = self.send(Method::DELETE, space_name, &[]).await?;
        Ok(())
    }

    // ===== Conference records =====

    async fn conference_records_page(
        &self,
        page_token: Option<String>,
    ) -> Result<Page<ConferenceRecord>, DirectoryError> {
        let query = Self::page_query(page_token);
        let response: ListConferenceRecordsResponse =
            self.send(Method::GET, "conferenceRecords", &query).await?;
        debug!(count = response.conference_records.len(), "Fetched conference records page");
        Ok(Page::new(response.conference_records, response.next_page_token))
    }

    /// All conference records visible to the credential, fetched page by page
    /// as the stream is consumed.
    pub fn conference_records(
        &self,
    ) -> impl Stream<Item = Result<ConferenceRecord, DirectoryError>> + Send + '_ {
        paginate(move |token| self.conference_records_page(token))
    }

    // ===== Participants =====

    async fn participants_page(
        &self,
        conference: &str,
        page_token: Option<String>,
    ) -> Result<Page<ParticipantRecord>, DirectoryError> {
        let query = Self::page_query(page_token);
        let path = format!("{}/participants", conference);
        let response: ListParticipantsResponse = self.send(Method::GET, &path, &query).await?;
        debug!(
            count = response.participants.len(),
            total = ?response.total_size,
            "Fetched participants page"
        );
        Ok(Page::new(response.participants, response.next_page_token))
    }

    /// Participants of `conference` (`conferenceRecords/{id}`), in API order
    pub fn participants<'a>(
        &'a self,
        conference: &'a str,
    ) -> impl Stream<Item = Result<ParticipantRecord, DirectoryError>> + Send + 'a {
        paginate(move |token| self.participants_page(conference, token))
    }
}
