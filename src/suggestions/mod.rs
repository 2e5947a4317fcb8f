//! Rule-based condition suggestions from questionnaire answers.
//!
//! Each rule is an independent `SuggestionRule` that inspects the answer set
//! and may emit one fixed suggestion record. The engine collects every rule
//! that fired, falls back to a general-evaluation record when none did,
//! ranks by probability and keeps the top `MAX_SUGGESTIONS`.
//! No inference and no state: the same answers always give the same output.

pub mod allergy;
pub mod catalog;
pub mod cold_flu;
pub mod digestive;
pub mod headache;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MAX_SUGGESTIONS;
use crate::questionnaire::AnswerSet;

// ─── Public types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Every condition the engine can suggest. Serialized as its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "Common Cold or Flu")]
    CommonColdOrFlu,
    #[serde(rename = "Gastroenteritis (Stomach Bug)")]
    Gastroenteritis,
    #[serde(rename = "Tension Headache")]
    TensionHeadache,
    #[serde(rename = "Migraine")]
    Migraine,
    #[serde(rename = "Allergic Reaction")]
    AllergicReaction,
    #[serde(rename = "General Symptoms Requiring Medical Evaluation")]
    GeneralEvaluation,
}

impl Condition {
    pub const ALL: [Condition; 6] = [
        Self::CommonColdOrFlu,
        Self::Gastroenteritis,
        Self::TensionHeadache,
        Self::Migraine,
        Self::AllergicReaction,
        Self::GeneralEvaluation,
    ];

    /// Patient-facing name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CommonColdOrFlu => "Common Cold or Flu",
            Self::Gastroenteritis => "Gastroenteritis (Stomach Bug)",
            Self::TensionHeadache => "Tension Headache",
            Self::Migraine => "Migraine",
            Self::AllergicReaction => "Allergic Reaction",
            Self::GeneralEvaluation => "General Symptoms Requiring Medical Evaluation",
        }
    }

    /// Short machine key, used on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            Self::CommonColdOrFlu => "cold_flu",
            Self::Gastroenteritis => "gastroenteritis",
            Self::TensionHeadache => "tension_headache",
            Self::Migraine => "migraine",
            Self::AllergicReaction => "allergic_reaction",
            Self::GeneralEvaluation => "general_evaluation",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Unknown condition: {0}")]
pub struct UnknownCondition(pub String);

impl FromStr for Condition {
    type Err = UnknownCondition;

    /// Accepts either the machine key or the exact display name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.key() == s || c.name() == s)
            .ok_or_else(|| UnknownCondition(s.into()))
    }
}

/// One candidate condition. Every field is a literal attached by the rule
/// that fired; `probability` is fixed per rule and only used for ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub condition: Condition,
    pub probability: u8,
    pub description: String,
    pub severity: Severity,
    pub category: String,
    pub symptoms: Vec<String>,
    pub recommendations: Vec<String>,
}

// ─── Trait ────────────────────────────────────────────────────────────────────

/// One independent predicate over the answer set.
pub trait SuggestionRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the rule's suggestion when its condition holds.
    /// Absent or wrongly shaped answers simply do not match.
    fn evaluate(&self, answers: &AnswerSet) -> Option<Suggestion>;
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct SuggestionEngine {
    rules: Vec<Box<dyn SuggestionRule>>,
    max_results: usize,
}

impl SuggestionEngine {
    /// The standard rule set, in declaration order.
    pub fn new() -> Self {
        Self::with_rules(
            vec![
                Box::new(cold_flu::ColdFluRule),
                Box::new(digestive::GastroenteritisRule),
                Box::new(headache::TensionHeadacheRule),
                Box::new(headache::MigraineRule),
                Box::new(allergy::AllergicReactionRule),
            ],
            MAX_SUGGESTIONS,
        )
    }

    /// Custom rule list. `max_results` is floored at 1 so the fallback always survives.
    pub fn with_rules(rules: Vec<Box<dyn SuggestionRule>>, max_results: usize) -> Self {
        Self {
            rules,
            max_results: max_results.max(1),
        }
    }

    pub fn suggest(&self, answers: &AnswerSet) -> Vec<Suggestion> {
        let mut candidates: Vec<Suggestion> = self
            .rules
            .iter()
            .filter_map(|rule| {
                let fired = rule.evaluate(answers);
                if fired.is_some() {
                    tracing::trace!(rule = rule.name(), "Suggestion rule fired");
                }
                fired
            })
            .collect();

        let fired = candidates.len();
        if candidates.is_empty() {
            candidates.push(catalog::suggestion_for(Condition::GeneralEvaluation));
        }

        rank(&mut candidates, self.max_results);

        tracing::debug!(
            answered = answers.len(),
            fired,
            returned = candidates.len(),
            "Suggestions generated"
        );

        candidates
    }
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Rank answers with the standard rule set.
pub fn generate_suggestions(answers: &AnswerSet) -> Vec<Suggestion> {
    SuggestionEngine::new().suggest(answers)
}

/// Probability descending; `sort_by` is stable so ties keep rule order.
fn rank(candidates: &mut Vec<Suggestion>, max_results: usize) {
    candidates.sort_by(|a, b| b.probability.cmp(&a.probability));
    candidates.truncate(max_results);
}
