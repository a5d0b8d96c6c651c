use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of the interview spoke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Interviewer,
    Candidate,
}

impl Role {
    /// Label used when a turn is written back out as text
    pub fn label(self) -> &'static str {
        match self {
            Role::Interviewer => "Interviewer",
            Role::Candidate => "Candidate",
        }
    }

    /// Map a role reported by the capture layer. The capture layer calls the
    /// candidate `user`; everything else is the interviewer persona.
    pub fn from_capture_role(role: &str) -> Self {
        if role.eq_ignore_ascii_case("user") {
            Role::Candidate
        } else {
            Role::Interviewer
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One attributed utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// `Role: content`
    pub fn to_line(&self) -> String {
        format!("{}: {}", self.role.label(), self.content)
    }
}

/// A message as emitted by live conversation capture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturedMessage {
    pub role: String,
    pub content: String,
}

/// Join turns as labeled lines separated by a blank line
pub fn render_turns(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .map(ConversationTurn::to_line)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render captured messages into transcript text
pub fn render_captured(messages: &[CapturedMessage]) -> String {
    let turns: Vec<ConversationTurn> = messages
        .iter()
        .map(|m| ConversationTurn::new(Role::from_capture_role(&m.role), m.content.clone()))
        .collect();
    render_turns(&turns)
}
