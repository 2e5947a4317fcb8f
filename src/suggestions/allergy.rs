//! Allergic reaction rule: nasal / throat symptoms without fever.
//!
//! The fever check is a plain substring test on the answer's text: any
//! value containing "fever" blocks the rule. Every fever option contains
//! that word ("No fever" included), so in practice the rule only fires
//! when the fever question was left unanswered.

use crate::questionnaire::{AnswerSet, QuestionId};

use super::catalog::suggestion_for;
use super::{Condition, Suggestion, SuggestionRule};

const ALLERGY_SIGNS: &[&str] = &["Runny nose", "Sore throat"];

pub struct AllergicReactionRule;

impl SuggestionRule for AllergicReactionRule {
    fn name(&self) -> &'static str {
        "allergic_reaction"
    }

    fn evaluate(&self, answers: &AnswerSet) -> Option<Suggestion> {
        let signs = answers.selects_any(QuestionId::Respiratory, ALLERGY_SIGNS);
        let mentions_fever = answers
            .get(QuestionId::Fever)
            .is_some_and(|v| v.to_text().contains("fever"));

        (signs && !mentions_fever).then(|| suggestion_for(Condition::AllergicReaction))
    }
}
