use crate::questionnaire::{AnswerSet, QuestionId};

use super::catalog::suggestion_for;
use super::{Condition, Suggestion, SuggestionRule};

const GASTRO_SIGNS: &[&str] = &["Nausea", "Vomiting", "Diarrhea"];

pub struct GastroenteritisRule;

impl SuggestionRule for GastroenteritisRule {
    fn name(&self) -> &'static str {
        "gastroenteritis"
    }

    fn evaluate(&self, answers: &AnswerSet) -> Option<Suggestion> {
        answers
            .selects_any(QuestionId::Digestive, GASTRO_SIGNS)
            .then(|| suggestion_for(Condition::Gastroenteritis))
    }
}
