use std::fmt;

use serde_json::error::Category;

use crate::models::SummaryResult;

/// Why a model reply could not be used as a summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFailureKind {
    /// Text is not JSON and contains nothing that looks like an object
    NoObjectFound,
    /// An object-shaped substring exists but is not valid JSON
    NotJson,
    /// Valid JSON without the expected fields or field types
    SchemaMismatch,
    /// All fields present but one is blank
    EmptyField(&'static str),
}

impl fmt::Display for ParseFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseFailureKind::NoObjectFound => f.write_str("no JSON object found"),
            ParseFailureKind::NotJson => f.write_str("malformed JSON"),
            ParseFailureKind::SchemaMismatch => f.write_str("JSON does not match summary schema"),
            ParseFailureKind::EmptyField(field) => write!(f, "field {} is empty", field),
        }
    }
}

/// Outcome of interpreting a model reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryParse {
    Parsed(SummaryResult),
    Raw {
        text: String,
        reason: ParseFailureKind,
    },
}

impl SummaryParse {
    pub fn is_parsed(&self) -> bool {
        matches!(self, SummaryParse::Parsed(_))
    }
}

/// Interpret a model reply: strict parse of the whole text first, then the
/// first balanced `{...}` substring.
pub fn parse_summary(text: &str) -> SummaryParse {
    let trimmed = text.trim();

    let reason = match serde_json::from_str::<SummaryResult>(trimmed) {
        Ok(summary) => return checked(summary, text),
        Err(e) => match first_json_object(trimmed) {
            Some(candidate) => match serde_json::from_str::<SummaryResult>(candidate) {
                Ok(summary) => return checked(summary, text),
                Err(e) => failure_kind(&e),
            },
            None if e.classify() == Category::Data => ParseFailureKind::SchemaMismatch,
            None => ParseFailureKind::NoObjectFound,
        },
    };

    SummaryParse::Raw {
        text: text.to_string(),
        reason,
    }
}

fn checked(summary: SummaryResult, text: &str) -> SummaryParse {
    match summary.first_empty_field() {
        None => SummaryParse::Parsed(summary),
        Some(field) => SummaryParse::Raw {
            text: text.to_string(),
            reason: ParseFailureKind::EmptyField(field),
        },
    }
}

fn failure_kind(error: &serde_json::Error) -> ParseFailureKind {
    match error.classify() {
        Category::Data => ParseFailureKind::SchemaMismatch,
        _ => ParseFailureKind::NotJson,
    }
}

/// Locate the first balanced JSON object, honoring string literals and escapes
pub fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}
