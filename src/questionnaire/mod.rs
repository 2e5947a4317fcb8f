//! Symptom-intake questionnaire: question catalogue and typed answers.
//!
//! Six fixed questions, each with a kind (single choice, multiple choice,
//! 1–10 scale). Answers are tagged by kind so rules can pattern-match
//! without inspecting raw values. The stepping driver lives in `session`.

pub mod session;

pub use session::{QuestionnaireSession, StepOutcome};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ═══════════════════════════════════════════
// Question identifiers and kinds
// ═══════════════════════════════════════════

/// Declaration order is questionnaire order (and `AnswerSet` iteration order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionId {
    Fever,
    Pain,
    Respiratory,
    Severity,
    Duration,
    Digestive,
}

impl QuestionId {
    pub const ALL: [QuestionId; 6] = [
        Self::Fever,
        Self::Pain,
        Self::Respiratory,
        Self::Severity,
        Self::Duration,
        Self::Digestive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fever => "fever",
            Self::Pain => "pain",
            Self::Respiratory => "respiratory",
            Self::Severity => "severity",
            Self::Duration => "duration",
            Self::Digestive => "digestive",
        }
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionId {
    type Err = QuestionnaireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| QuestionnaireError::UnknownQuestion(s.into()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Single,
    Multiple,
    Scale,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multiple => "multiple",
            Self::Scale => "scale",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════

#[derive(Error, Debug, PartialEq)]
pub enum QuestionnaireError {
    #[error("Question '{0}' has not been answered")]
    NotAnswered(QuestionId),

    #[error("Question '{question}' expects a {expected} answer, got {found}")]
    WrongKind {
        question: QuestionId,
        expected: QuestionKind,
        found: QuestionKind,
    },

    #[error("'{option}' is not an option for question '{question}'")]
    UnknownOption { question: QuestionId, option: String },

    #[error("Scale value {value} for '{question}' must be between 1 and 10")]
    ScaleOutOfRange { question: QuestionId, value: i64 },

    #[error("'{input}' is not a number for question '{question}'")]
    InvalidScale { question: QuestionId, input: String },

    #[error("Unknown question: {0}")]
    UnknownQuestion(String),
}

// ═══════════════════════════════════════════
// Catalogue
// ═══════════════════════════════════════════

pub const SCALE_MIN: i64 = 1;
pub const SCALE_MAX: i64 = 10;

/// One questionnaire step. Scale questions carry no options.
#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: &'static str,
    pub kind: QuestionKind,
    pub options: &'static [&'static str],
    pub category: &'static str,
}

pub const NO_FEVER: &str = "No fever";

static QUESTIONS: [Question; 6] = [
    Question {
        id: QuestionId::Fever,
        prompt: "Are you experiencing fever?",
        kind: QuestionKind::Single,
        options: &["Yes, high fever (>101°F)", "Yes, mild fever (99-101°F)", NO_FEVER],
        category: "general",
    },
    Question {
        id: QuestionId::Pain,
        prompt: "What type of pain are you experiencing?",
        kind: QuestionKind::Multiple,
        options: &[
            "Headache", "Body aches", "Chest pain",
            "Abdominal pain", "Joint pain", "No pain",
        ],
        category: "pain",
    },
    Question {
        id: QuestionId::Respiratory,
        prompt: "Do you have any respiratory symptoms?",
        kind: QuestionKind::Multiple,
        options: &["Cough", "Shortness of breath", "Sore throat", "Runny nose", "None"],
        category: "respiratory",
    },
    Question {
        id: QuestionId::Severity,
        prompt: "How severe are your symptoms overall? (1 = mild, 10 = severe)",
        kind: QuestionKind::Scale,
        options: &[],
        category: "assessment",
    },
    Question {
        id: QuestionId::Duration,
        prompt: "How long have you been experiencing these symptoms?",
        kind: QuestionKind::Single,
        options: &["Less than 24 hours", "1-3 days", "4-7 days", "More than a week"],
        category: "timeline",
    },
    Question {
        id: QuestionId::Digestive,
        prompt: "Are you experiencing any digestive issues?",
        kind: QuestionKind::Multiple,
        options: &["Nausea", "Vomiting", "Diarrhea", "Loss of appetite", "None"],
        category: "digestive",
    },
];

/// All questions in questionnaire order.
pub fn questions() -> &'static [Question] {
    &QUESTIONS
}

pub fn question(id: QuestionId) -> &'static Question {
    // QUESTIONS is laid out in QuestionId declaration order.
    &QUESTIONS[id as usize]
}

impl Question {
    /// Check that a value fits this question's kind, options and range.
    pub fn validate(&self, value: &AnswerValue) -> Result<(), QuestionnaireError> {
        if value.kind() != self.kind {
            return Err(QuestionnaireError::WrongKind {
                question: self.id,
                expected: self.kind,
                found: value.kind(),
            });
        }
        match value {
            AnswerValue::Choice(label) => self.check_option(label),
            AnswerValue::Choices(labels) => labels.iter().try_for_each(|l| self.check_option(l)),
            AnswerValue::Scale(n) => {
                if (SCALE_MIN..=SCALE_MAX).contains(n) {
                    Ok(())
                } else {
                    Err(QuestionnaireError::ScaleOutOfRange {
                        question: self.id,
                        value: *n,
                    })
                }
            }
        }
    }

    /// Build a validated value from free text (CLI / form input).
    /// Multiple-choice input is comma-separated.
    pub fn parse_input(&self, raw: &str) -> Result<AnswerValue, QuestionnaireError> {
        let raw = raw.trim();
        let value = match self.kind {
            QuestionKind::Single => AnswerValue::Choice(raw.to_string()),
            QuestionKind::Multiple => AnswerValue::Choices(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            ),
            QuestionKind::Scale => {
                let n = raw.parse::<i64>().map_err(|_| QuestionnaireError::InvalidScale {
                    question: self.id,
                    input: raw.to_string(),
                })?;
                AnswerValue::Scale(n)
            }
        };
        self.validate(&value)?;
        Ok(value)
    }

    fn check_option(&self, label: &str) -> Result<(), QuestionnaireError> {
        if self.options.contains(&label) {
            Ok(())
        } else {
            Err(QuestionnaireError::UnknownOption {
                question: self.id,
                option: label.to_string(),
            })
        }
    }
}

// ═══════════════════════════════════════════
// Answers
// ═══════════════════════════════════════════

/// Answer payload, tagged by the shape its question produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AnswerValue {
    Choice(String),
    Choices(Vec<String>),
    Scale(i64),
}

impl AnswerValue {
    pub fn kind(&self) -> QuestionKind {
        match self {
            Self::Choice(_) => QuestionKind::Single,
            Self::Choices(_) => QuestionKind::Multiple,
            Self::Scale(_) => QuestionKind::Scale,
        }
    }

    pub fn as_choice(&self) -> Option<&str> {
        match self {
            Self::Choice(label) => Some(label),
            _ => None,
        }
    }

    pub fn as_choices(&self) -> Option<&[String]> {
        match self {
            Self::Choices(labels) => Some(labels),
            _ => None,
        }
    }

    pub fn as_scale(&self) -> Option<i64> {
        match self {
            Self::Scale(n) => Some(*n),
            _ => None,
        }
    }

    /// Flat text form: label, comma-joined labels, or the number.
    pub fn to_text(&self) -> String {
        match self {
            Self::Choice(label) => label.clone(),
            Self::Choices(labels) => labels.join(","),
            Self::Scale(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question: QuestionId,
    pub value: AnswerValue,
}

/// At most one answer per question. Iterates in questionnaire order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSet {
    answers: BTreeMap<QuestionId, AnswerValue>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of `set`.
    pub fn with(mut self, question: QuestionId, value: AnswerValue) -> Self {
        self.set(question, value);
        self
    }

    /// Record an answer, returning the one it replaced.
    pub fn set(&mut self, question: QuestionId, value: AnswerValue) -> Option<AnswerValue> {
        self.answers.insert(question, value)
    }

    pub fn get(&self, question: QuestionId) -> Option<&AnswerValue> {
        self.answers.get(&question)
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, &AnswerValue)> {
        self.answers.iter().map(|(q, v)| (*q, v))
    }

    /// Single-choice label, `None` when absent or not a single choice.
    pub fn choice(&self, question: QuestionId) -> Option<&str> {
        self.get(question).and_then(AnswerValue::as_choice)
    }

    /// Selected labels, empty when absent or not a multiple choice.
    pub fn selections(&self, question: QuestionId) -> &[String] {
        self.get(question)
            .and_then(AnswerValue::as_choices)
            .unwrap_or(&[])
    }

    /// Scale value, `None` when absent or not numeric.
    pub fn scale(&self, question: QuestionId) -> Option<i64> {
        self.get(question).and_then(AnswerValue::as_scale)
    }

    /// True when the multiple-choice answer contains any of `labels`.
    pub fn selects_any(&self, question: QuestionId, labels: &[&str]) -> bool {
        self.selections(question)
            .iter()
            .any(|s| labels.contains(&s.as_str()))
    }
}

impl FromIterator<Answer> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = Answer>>(iter: I) -> Self {
        let mut set = Self::new();
        for answer in iter {
            set.set(answer.question, answer.value);
        }
        set
    }
}
