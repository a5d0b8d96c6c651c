use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ConversationTurn, InterviewSession, SessionId, SessionStatus, SummaryResult};

const UNAVAILABLE_KEY_POINTS: &str = "No transcript was available for this interview; knowledge transfer analysis unavailable.";
const UNAVAILABLE_KNOWLEDGE_TRANSFER: &str = "Analysis unavailable: no transcript to extract critical knowledge from.";
const UNAVAILABLE_DOCUMENTATION_GAPS: &str = "Analysis unavailable: the whole interview remains undocumented.";
const UNAVAILABLE_RECOMMENDATIONS: &str = "Analysis unavailable: arrange a follow-up handover session with the departing employee.";
const UNAVAILABLE_ORGANIZATIONAL_VALUE: &str = "Analysis unavailable: no interview content was captured.";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInsights {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_transfer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_gaps: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    pub total_responses: usize,
    pub key_points: String,
    #[serde(default)]
    pub insights: RecordInsights,
    pub recommendations: String,
    pub organizational_value: String,
}

impl RecordSummary {
    pub fn from_analysis(total_responses: usize, summary: SummaryResult) -> Self {
        Self {
            total_responses,
            key_points: summary.key_points,
            insights: RecordInsights {
                knowledge_transfer: Some(summary.knowledge_transfer),
                documentation_gaps: Some(summary.documentation_gaps),
            },
            recommendations: summary.successor_recommendations,
            organizational_value: summary.organizational_value,
        }
    }

    /// Placeholder summary for an interview with no transcript
    pub fn unavailable() -> Self {
        Self {
            total_responses: 0,
            key_points: UNAVAILABLE_KEY_POINTS.to_string(),
            insights: RecordInsights {
                knowledge_transfer: Some(UNAVAILABLE_KNOWLEDGE_TRANSFER.to_string()),
                documentation_gaps: Some(UNAVAILABLE_DOCUMENTATION_GAPS.to_string()),
            },
            recommendations: UNAVAILABLE_RECOMMENDATIONS.to_string(),
            organizational_value: UNAVAILABLE_ORGANIZATIONAL_VALUE.to_string(),
        }
    }
}

/// The persisted output of one documentation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationRecord {
    pub candidate_name: String,
    pub position: String,
    pub interview_date: DateTime<Utc>,
    pub summary: RecordSummary,
    #[serde(default)]
    pub full_responses: Vec<ConversationTurn>,
    #[serde(default)]
    pub transcript: String,
}

impl DocumentationRecord {
    /// Session metadata denormalized into a previously written record
    pub fn to_session(&self, session_id: SessionId) -> InterviewSession {
        InterviewSession {
            session_id,
            candidate_name: self.candidate_name.clone(),
            position: self.position.clone(),
            start_time: self.interview_date,
            status: SessionStatus::Completed,
        }
    }
}
