use std::fmt;

use serde::{Deserialize, Serialize};

// Raw participant as returned by `conferenceRecords.participants.list`.
// Exactly one of the user fields is populated per record.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ParticipantRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "signedinUser", default)]
    pub signedin_user: Option<SignedinUser>,
    #[serde(rename = "anonymousUser", default)]
    pub anonymous_user: Option<AnonymousUser>,
    #[serde(rename = "phoneUser", default)]
    pub phone_user: Option<PhoneUser>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SignedinUser {
    /// `users/{user}`
    #[serde(default)]
    pub user: Option<String>,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AnonymousUser {
    #[serde(rename = "displayName", default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PhoneUser {
    #[serde(rename = "displayName", default)]
    pub display_name: String,
}

impl ParticipantRecord {
    /// Classify the record. Anonymous identity is checked first; records
    /// with neither a signed-in nor an anonymous identity yield `None`.
    pub fn into_participant(self) -> Option<Participant> {
        if let Some(anon) = self.anonymous_user {
            Some(Participant {
                display_name: anon.display_name,
                kind: ParticipantKind::Anonymous,
            })
        } else {
            self.signedin_user.map(|user| Participant {
                display_name: user.display_name,
                kind: ParticipantKind::SignedIn,
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantKind {
    SignedIn,
    Anonymous,
}

impl fmt::Display for ParticipantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantKind::SignedIn => write!(f, "signed-in"),
            ParticipantKind::Anonymous => write!(f, "anonymous"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub display_name: String,
    pub kind: ParticipantKind,
}

/// Attendance of one conference, in the order the API returned it.
///
/// Serialized as `{"parent_name", "signed_users", "anonymus_users"}`; the
/// misspelled key is kept so existing consumers of attendance files keep
/// working. Either spelling is accepted when reading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ParticipantRoster {
    pub parent_name: String,
    pub signed_users: Vec<String>,
    #[serde(rename = "anonymus_users", alias = "anonymous_users")]
    pub anonymous_users: Vec<String>,
}

impl ParticipantRoster {
    pub fn new(parent_name: impl Into<String>) -> Self {
        Self {
            parent_name: parent_name.into(),
            signed_users: Vec::new(),
            anonymous_users: Vec::new(),
        }
    }

    pub fn push(&mut self, participant: Participant) {
        match participant.kind {
            ParticipantKind::SignedIn => self.signed_users.push(participant.display_name),
            ParticipantKind::Anonymous => self.anonymous_users.push(participant.display_name),
        }
    }

    pub fn total(&self) -> usize {
        self.signed_users.len() + self.anonymous_users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ParticipantRecord {
        serde_json::from_str(json).expect("Failed to parse participant test JSON")
    }

    #[test]
    fn test_anonymous_record_is_anonymous() {
        let record = parse(
            r#"{"name": "conferenceRecords/c/participants/1", "anonymousUser": {"displayName": "Guest 1"}}"#,
        );
        let participant = record.into_participant().unwrap();
        assert_eq!(participant.kind, ParticipantKind::Anonymous);
        assert_eq!(participant.kind.to_string(), "anonymous");
        assert_eq!(participant.display_name, "Guest 1");
    }

    #[test]
    fn test_signed_in_record_is_signed_in() {
        let record = parse(
            r#"{"signedinUser": {"user": "users/1234", "displayName": "Ada Lovelace"}}"#,
        );
        let participant = record.into_participant().unwrap();
        assert_eq!(participant.kind, ParticipantKind::SignedIn);
        assert_eq!(participant.display_name, "Ada Lovelace");
    }

    #[test]
    fn test_phone_only_record_is_dropped() {
        let record = parse(r#"{"phoneUser": {"displayName": "+1 555 *** **12"}}"#);
        assert!(record.into_participant().is_none());
        assert!(parse("{}").into_participant().is_none());
    }

    #[test]
    fn test_roster_keeps_kinds_apart() {
        let mut roster = ParticipantRoster::new("conferenceRecords/c");
        roster.push(Participant {
            display_name: "Guest".to_string(),
            kind: ParticipantKind::Anonymous,
        });
        roster.push(Participant {
            display_name: "Ada".to_string(),
            kind: ParticipantKind::SignedIn,
        });
        roster.push(Participant {
            display_name: "Ada".to_string(),
            kind: ParticipantKind::SignedIn,
        });

        assert_eq!(roster.signed_users, vec!["Ada", "Ada"]);
        assert_eq!(roster.anonymous_users, vec!["Guest"]);
        assert!(!roster.signed_users.contains(&"Guest".to_string()));
        assert_eq!(roster.total(), 3);
    }

    #[test]
    fn test_roster_serializes_legacy_key() {
        let mut roster = ParticipantRoster::new("conferenceRecords/c");
        roster.anonymous_users.push("Guest".to_string());

        let value = serde_json::to_value(&roster).unwrap();
        assert_eq!(value["parent_name"], "conferenceRecords/c");
        assert_eq!(value["anonymus_users"][0], "Guest");
        assert!(value.get("anonymous_users").is_none());

        let corrected = r#"{"parent_name": "p", "signed_users": [], "anonymous_users": ["x"]}"#;
        let parsed: ParticipantRoster = serde_json::from_str(corrected).unwrap();
        assert_eq!(parsed.anonymous_users, vec!["x"]);
    }
}
