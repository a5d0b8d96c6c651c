use tracing::debug;

use crate::models::{ConversationTurn, Role};

/// A pair of speaker labels and the roles they stand for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelConvention {
    pub name: &'static str,
    pub labels: [(&'static str, Role); 2],
}

/// Known conventions, in priority order
pub const LABEL_CONVENTIONS: &[LabelConvention] = &[
    LabelConvention {
        name: "Interviewer/Candidate",
        labels: [("Interviewer:", Role::Interviewer), ("Candidate:", Role::Candidate)],
    },
    LabelConvention {
        name: "Cara/User",
        labels: [("Cara:", Role::Interviewer), ("User:", Role::Candidate)],
    },
];

impl LabelConvention {
    /// Both labels appear somewhere in the text
    pub fn matches(&self, text: &str) -> bool {
        self.labels.iter().all(|(label, _)| text.contains(label))
    }

    /// Earliest label in the line decides the role. The content is the rest
    /// of the line with the label cut out, so leading text such as a
    /// timestamp is kept.
    fn split_turn_start(&self, line: &str) -> Option<(Role, String)> {
        let (pos, len, role) = self
            .labels
            .iter()
            .filter_map(|(label, role)| line.find(label).map(|pos| (pos, label.len(), *role)))
            .min_by_key(|(pos, _, _)| *pos)?;

        let content = [line[..pos].trim(), line[pos + len..].trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Some((role, content))
    }
}

/// Splits free transcript text into speaker turns
#[derive(Debug, Clone)]
pub struct TurnParser {
    conventions: Vec<LabelConvention>,
}

impl Default for TurnParser {
    fn default() -> Self {
        Self::new(LABEL_CONVENTIONS.to_vec())
    }
}

impl TurnParser {
    pub fn new(conventions: Vec<LabelConvention>) -> Self {
        Self { conventions }
    }

    /// First convention whose labels both occur in the text
    pub fn detect(&self, text: &str) -> Option<&LabelConvention> {
        self.conventions.iter().find(|c| c.matches(text))
    }

    /// Parse text into ordered turns.
    ///
    /// Lines containing a label start a turn; other non-blank lines continue
    /// the current one, joined by a single space. Text in no known convention
    /// yields no turns.
    pub fn parse(&self, text: &str) -> Vec<ConversationTurn> {
        let Some(convention) = self.detect(text) else {
            debug!("No speaker label convention detected");
            return vec![];
        };

        let mut turns = Vec::new();
        let mut current: Option<(Role, String)> = None;

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some((role, content)) = convention.split_turn_start(line) {
                if let Some((role, content)) = current.take() {
                    turns.push(ConversationTurn::new(role, content));
                }
                current = Some((role, content));
            } else if let Some((_, content)) = current.as_mut() {
                if !content.is_empty() {
                    content.push(' ');
                }
                content.push_str(line);
            }
        }

        if let Some((role, content)) = current {
            turns.push(ConversationTurn::new(role, content));
        }

        debug!(
            "Parsed {} turns using {} convention",
            turns.len(),
            convention.name
        );
        turns
    }
}

/// Parse with the default conventions
pub fn parse_turns(text: &str) -> Vec<ConversationTurn> {
    TurnParser::default().parse(text)
}
