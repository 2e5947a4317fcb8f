//! Cold / flu rule: any reported fever, or common upper-respiratory symptoms.

use crate::questionnaire::{AnswerSet, QuestionId, NO_FEVER};

use super::catalog::suggestion_for;
use super::{Condition, Suggestion, SuggestionRule};

const RESPIRATORY_SIGNS: &[&str] = &["Cough", "Runny nose", "Sore throat"];

pub struct ColdFluRule;

impl SuggestionRule for ColdFluRule {
    fn name(&self) -> &'static str {
        "cold_flu"
    }

    fn evaluate(&self, answers: &AnswerSet) -> Option<Suggestion> {
        // Fever clause needs a single-choice answer other than "No fever".
        let has_fever = answers
            .choice(QuestionId::Fever)
            .is_some_and(|label| label != NO_FEVER);
        let respiratory = answers.selects_any(QuestionId::Respiratory, RESPIRATORY_SIGNS);

        (has_fever || respiratory).then(|| suggestion_for(Condition::CommonColdOrFlu))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questionnaire::AnswerValue;

    fn fever(label: &str) -> AnswerSet {
        AnswerSet::new().with(QuestionId::Fever, AnswerValue::Choice(label.into()))
    }

    #[test]
    fn fires_on_high_or_mild_fever() {
        assert!(ColdFluRule.evaluate(&fever("Yes, high fever (>101°F)")).is_some());
        assert!(ColdFluRule.evaluate(&fever("Yes, mild fever (99-101°F)")).is_some());
    }

    #[test]
    fn silent_on_no_fever_alone() {
        assert!(ColdFluRule.evaluate(&fever(NO_FEVER)).is_none());
    }

    #[test]
    fn silent_when_fever_unanswered() {
        assert!(ColdFluRule.evaluate(&AnswerSet::new()).is_none());
    }

    #[test]
    fn respiratory_clause_overrides_no_fever() {
        let answers = fever(NO_FEVER).with(
            QuestionId::Respiratory,
            AnswerValue::Choices(vec!["Shortness of breath".into(), "Sore throat".into()]),
        );
        let s = ColdFluRule.evaluate(&answers).unwrap();
        assert_eq!(s.condition, Condition::CommonColdOrFlu);
        assert_eq!(s.probability, 85);
    }

    #[test]
    fn shortness_of_breath_alone_does_not_fire() {
        let answers = AnswerSet::new().with(
            QuestionId::Respiratory,
            AnswerValue::Choices(vec!["Shortness of breath".into()]),
        );
        assert!(ColdFluRule.evaluate(&answers).is_none());
    }
}
