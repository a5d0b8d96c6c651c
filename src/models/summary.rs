use serde::{Deserialize, Deserializer, Serialize};

/// Five-field knowledge transfer analysis of one interview.
///
/// The model may answer any field with either a string or a list of strings;
/// lists are folded into newline-separated text so the report can bullet them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    #[serde(deserialize_with = "text_or_list")]
    pub key_points: String,
    #[serde(deserialize_with = "text_or_list")]
    pub knowledge_transfer: String,
    #[serde(deserialize_with = "text_or_list")]
    pub documentation_gaps: String,
    #[serde(deserialize_with = "text_or_list")]
    pub successor_recommendations: String,
    #[serde(deserialize_with = "text_or_list")]
    pub organizational_value: String,
}

impl SummaryResult {
    /// Canned analysis used whenever the model cannot produce one
    pub fn fallback() -> Self {
        Self {
            key_points: "Unable to generate detailed analysis due to processing error. Transcript contains employee responses about their work history and knowledge.".to_string(),
            knowledge_transfer: "Review transcript for critical knowledge that needs to be documented for organizational continuity.".to_string(),
            documentation_gaps: "Additional documentation may be needed in areas where responses were incomplete.".to_string(),
            successor_recommendations: "Successors should review the full transcript to understand processes and knowledge areas.".to_string(),
            organizational_value: "The transcript contains valuable insights for knowledge transfer and organizational continuity.".to_string(),
        }
    }

    /// Name of the first field that is blank, if any
    pub fn first_empty_field(&self) -> Option<&'static str> {
        [
            ("keyPoints", &self.key_points),
            ("knowledgeTransfer", &self.knowledge_transfer),
            ("documentationGaps", &self.documentation_gaps),
            ("successorRecommendations", &self.successor_recommendations),
            ("organizationalValue", &self.organizational_value),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrList {
    Text(String),
    List(Vec<String>),
}

fn text_or_list<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match TextOrList::deserialize(deserializer)? {
        TextOrList::Text(text) => text,
        TextOrList::List(items) => items.join("\n"),
    })
}
