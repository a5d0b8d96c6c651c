use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Identifier joining every artifact of one interview.
///
/// Session ids end up in file names, so only ASCII alphanumerics, `-` and `_`
/// are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, PipelineError> {
        let raw = raw.into();
        let valid = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(raw))
        } else {
            Err(PipelineError::InvalidSessionId(raw))
        }
    }

    /// Mint a fresh id for a new interview
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SessionId {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
}

/// Interview metadata owned by the orchestration layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSession {
    pub session_id: SessionId,
    pub candidate_name: String,
    pub position: String,
    pub start_time: DateTime<Utc>,
    pub status: SessionStatus,
}

impl InterviewSession {
    /// Start a new active interview
    pub fn start(candidate_name: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            session_id: SessionId::generate(),
            candidate_name: candidate_name.into(),
            position: position.into(),
            start_time: Utc::now(),
            status: SessionStatus::Active,
        }
    }

    pub fn completed(mut self) -> Self {
        self.status = SessionStatus::Completed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_validation() {
        assert!(SessionId::parse("1718031234567").is_ok());
        assert!(SessionId::parse("a1b2-c3_d4").is_ok());
        assert!(SessionId::parse("").is_err());
        assert!(SessionId::parse("../etc/passwd").is_err());
        assert!(SessionId::parse("has space").is_err());
    }

    #[test]
    fn test_generated_ids_are_valid_and_distinct() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
        assert!(SessionId::parse(a.as_str()).is_ok());
    }

    #[test]
    fn test_session_round_trips_as_camel_case() {
        let session = InterviewSession::start("Ada Lovelace", "Staff Engineer");
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["candidateName"], "Ada Lovelace");
        assert_eq!(json["status"], "active");

        let back: InterviewSession = serde_json::from_value(json).unwrap();
        assert_eq!(back, session);
        assert_eq!(back.completed().status, SessionStatus::Completed);
    }

    #[test]
    fn test_bad_session_id_rejected_on_deserialize() {
        let result: Result<SessionId, _> = serde_json::from_str("\"a/b\"");
        assert!(result.is_err());
    }
}
