//! Conference lookup and participant reading.
//!
//! The polling loop only depends on the two traits here, so it can run
//! against the Meet API or against stubs.

use async_trait::async_trait;
use futures::{pin_mut, Stream, TryStreamExt};
use tracing::debug;

use crate::api::{DirectoryError, MeetClient};
use crate::models::{ConferenceRecord, ParticipantRecord, ParticipantRoster};

/// Finds the conference that is currently running.
#[async_trait]
pub trait ConferenceDirectory: Send + Sync {
    /// The first conference record without an end time, if any.
    async fn list_active_conference(&self) -> Result<Option<ConferenceRecord>, DirectoryError>;
}

/// Reads the attendance of a conference.
#[async_trait]
pub trait ParticipantReader: Send + Sync {
    async fn list_participants(&self, conference: &str) -> Result<ParticipantRoster, DirectoryError>;
}

/// Consume `records` until the first active conference. Nothing past the
/// match is pulled from the stream.
pub async fn first_active<S>(records: S) -> Result<Option<ConferenceRecord>, DirectoryError>
where
    S: Stream<Item = Result<ConferenceRecord, DirectoryError>>,
{
    pin_mut!(records);
    while let Some(record) = records.try_next().await? {
        if record.is_active() {
            return Ok(Some(record));
        }
        debug!(conference = %record.name, "Skipping ended conference");
    }
    Ok(None)
}

/// Drain `participants` into a roster, keeping API order.
pub async fn collect_roster<S>(conference: &str, participants: S) -> Result<ParticipantRoster, DirectoryError>
where
    S: Stream<Item = Result<ParticipantRecord, DirectoryError>>,
{
    pin_mut!(participants);
    let mut roster = ParticipantRoster::new(conference);
    while let Some(record) = participants.try_next().await? {
        let resource = record.name.clone();
        match record.into_participant() {
            Some(participant) => {
                debug!(name = %participant.display_name, kind = %participant.kind, "Participant");
                roster.push(participant);
            }
            None => debug!(participant = ?resource, "Dropping participant without user identity"),
        }
    }
    Ok(roster)
}

impl MeetClient {
    /// Every conference record, all pages drained
    pub async fn list_conferences(&self) -> Result<Vec<ConferenceRecord>, DirectoryError> {
        self.conference_records().try_collect().await
    }
}

#[async_trait]
impl ConferenceDirectory for MeetClient {
    async fn list_active_conference(&self) -> Result<Option<ConferenceRecord>, DirectoryError> {
        first_active(self.conference_records()).await
    }
}

#[async_trait]
impl ParticipantReader for MeetClient {
    async fn list_participants(&self, conference: &str) -> Result<ParticipantRoster, DirectoryError> {
        collect_roster(conference, self.participants(conference)).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::api::client::test_server::serve;
    use crate::api::{paginate, Page};

    fn ended(name: &str) -> ConferenceRecord {
        ConferenceRecord {
            name: name.to_string(),
            space: Some("spaces/s".to_string()),
            start_time: Some(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()),
            end_time: Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()),
            expire_time: None,
        }
    }

    fn active(name: &str) -> ConferenceRecord {
        ConferenceRecord {
            end_time: None,
            ..ended(name)
        }
    }

    /// Stream `pages` through the real paginator, counting page fetches
    fn paged(
        pages: Vec<Vec<ConferenceRecord>>,
        calls: Arc<AtomicUsize>,
    ) -> impl Stream<Item = Result<ConferenceRecord, DirectoryError>> {
        paginate(move |token: Option<String>| {
            calls.fetch_add(1, Ordering::SeqCst);
            let index: usize = token.map(|t| t.parse().unwrap()).unwrap_or(0);
            let next = (index + 1 < pages.len()).then(|| (index + 1).to_string());
            futures::future::ready(Ok::<_, DirectoryError>(Page::new(pages[index].clone(), next)))
        })
    }

    #[tokio::test]
    async fn test_no_active_when_all_ended() {
        let calls = Arc::new(AtomicUsize::new(0));
        let records = paged(
            vec![vec![ended("conferenceRecords/1"), ended("conferenceRecords/2"), ended("conferenceRecords/3")]],
            calls.clone(),
        );

        assert_eq!(first_active(records).await.unwrap(), None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_active_found_on_second_page() {
        let calls = Arc::new(AtomicUsize::new(0));
        let records = paged(
            vec![
                vec![ended("conferenceRecords/old")],
                vec![active("conferenceRecords/live")],
                vec![active("conferenceRecords/never-fetched")],
            ],
            calls.clone(),
        );

        let found = first_active(records).await.unwrap().unwrap();
        assert_eq!(found.name, "conferenceRecords/live");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_first_of_several_active_wins() {
        let calls = Arc::new(AtomicUsize::new(0));
        let records = paged(
            vec![vec![active("conferenceRecords/a"), active("conferenceRecords/b")]],
            calls,
        );

        let found = first_active(records).await.unwrap().unwrap();
        assert_eq!(found.name, "conferenceRecords/a");
    }

    #[tokio::test]
    async fn test_error_propagates() {
        let records = futures::stream::iter(vec![
            Ok(ended("conferenceRecords/1")),
            Err(DirectoryError::Unauthorized),
        ]);
        assert!(matches!(first_active(records).await, Err(DirectoryError::Unauthorized)));
    }

    fn record(json: &str) -> ParticipantRecord {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn test_collect_roster_classifies_and_keeps_order() {
        let records = futures::stream::iter(vec![
            Ok(record(r#"{"signedinUser": {"displayName": "Zed"}}"#)),
            Ok(record(r#"{"anonymousUser": {"displayName": "Guest 2"}}"#)),
            Ok(record(r#"{"phoneUser": {"displayName": "+1 555"}}"#)),
            Ok(record(r#"{"signedinUser": {"displayName": "Ada"}}"#)),
            Ok(record(r#"{"anonymousUser": {"displayName": "Guest 1"}}"#)),
        ]);

        let roster = collect_roster("conferenceRecords/c", records).await.unwrap();
        assert_eq!(roster.parent_name, "conferenceRecords/c");
        assert_eq!(roster.signed_users, vec!["Zed", "Ada"]);
        assert_eq!(roster.anonymous_users, vec!["Guest 2", "Guest 1"]);
    }

    #[tokio::test]
    async fn test_meet_client_finds_active_conference() {
        let mut routes = HashMap::new();
        routes.insert(
            "GET /v2/conferenceRecords?pageSize=100".to_string(),
            (
                200,
                r#"{"conferenceRecords": [{"name": "conferenceRecords/old", "endTime": "2024-01-01T10:00:00Z"}], "nextPageToken": "t"}"#.to_string(),
            ),
        );
        routes.insert(
            "GET /v2/conferenceRecords?pageSize=100&pageToken=t".to_string(),
            (200, r#"{"conferenceRecords": [{"name": "conferenceRecords/live"}]}"#.to_string()),
        );
        routes.insert(
            "GET /v2/conferenceRecords/live/participants?pageSize=100".to_string(),
            (
                200,
                r#"{"participants": [{"anonymousUser": {"displayName": "Guest"}}, {"signedinUser": {"displayName": "Ada"}}]}"#.to_string(),
            ),
        );
        let (base_url, _log) = serve(routes).await;
        let client = MeetClient::with_base_url(&base_url, "token").unwrap();

        let conference = client.list_active_conference().await.unwrap().unwrap();
        assert_eq!(conference.name, "conferenceRecords/live");

        let roster = client.list_participants(&conference.name).await.unwrap();
        assert_eq!(roster.signed_users, vec!["Ada"]);
        assert_eq!(roster.anonymous_users, vec!["Guest"]);

        assert_eq!(client.list_conferences().await.unwrap().len(), 2);
    }
}
