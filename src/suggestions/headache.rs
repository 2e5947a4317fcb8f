//! Headache rules. Tension headache fires on any reported headache; migraine
//! additionally needs an overall severity of 7 or more, so a severe headache
//! yields both.

use crate::questionnaire::{AnswerSet, QuestionId};

use super::catalog::suggestion_for;
use super::{Condition, Suggestion, SuggestionRule};

pub const MIGRAINE_SEVERITY_THRESHOLD: i64 = 7;

fn reports_headache(answers: &AnswerSet) -> bool {
    answers.selects_any(QuestionId::Pain, &["Headache"])
}

pub struct TensionHeadacheRule;

impl SuggestionRule for TensionHeadacheRule {
    fn name(&self) -> &'static str {
        "tension_headache"
    }

    fn evaluate(&self, answers: &AnswerSet) -> Option<Suggestion> {
        reports_headache(answers).then(|| suggestion_for(Condition::TensionHeadache))
    }
}

pub struct MigraineRule;

impl SuggestionRule for MigraineRule {
    fn name(&self) -> &'static str {
        "migraine"
    }

    fn evaluate(&self, answers: &AnswerSet) -> Option<Suggestion> {
        let severe = answers
            .scale(QuestionId::Severity)
            .is_some_and(|s| s >= MIGRAINE_SEVERITY_THRESHOLD);
        (reports_headache(answers) && severe).then(|| suggestion_for(Condition::Migraine))
    }
}
