//! Questionnaire driver: steps through the six questions and hands the
//! completed answer set to the caller.
//!
//! Owned by the caller; the suggestion engine never sees this type.

use super::{questions, AnswerSet, AnswerValue, Question, QuestionKind, QuestionnaireError};

/// Result of pressing "Next".
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Moved to the given step index.
    Advanced(usize),
    /// Last question answered; the full set is ready for the engine.
    Complete(AnswerSet),
}

#[derive(Debug, Clone, Default)]
pub struct QuestionnaireSession {
    step: usize,
    answers: AnswerSet,
}

impl QuestionnaireSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_step(&self) -> usize {
        self.step
    }

    pub fn total_steps(&self) -> usize {
        questions().len()
    }

    pub fn is_last_step(&self) -> bool {
        self.step + 1 == self.total_steps()
    }

    pub fn current_question(&self) -> &'static Question {
        &questions()[self.step]
    }

    pub fn current_answer(&self) -> Option<&AnswerValue> {
        self.answers.get(self.current_question().id)
    }

    /// Gates "Next". An empty multiple-choice selection still counts as answered.
    pub fn is_answered(&self) -> bool {
        self.current_answer().is_some()
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    /// Record (or replace) the answer for the current step.
    pub fn answer(&mut self, value: AnswerValue) -> Result<(), QuestionnaireError> {
        let q = self.current_question();
        q.validate(&value)?;
        self.answers.set(q.id, value);
        Ok(())
    }

    /// Flip one label in the current multiple-choice selection.
    pub fn toggle(&mut self, label: &str) -> Result<(), QuestionnaireError> {
        let q = self.current_question();
        if q.kind != QuestionKind::Multiple {
            return Err(QuestionnaireError::WrongKind {
                question: q.id,
                expected: q.kind,
                found: QuestionKind::Multiple,
            });
        }

        let mut selected = self.answers.selections(q.id).to_vec();
        if let Some(pos) = selected.iter().position(|s| s == label) {
            selected.remove(pos);
        } else {
            selected.push(label.to_string());
        }
        self.answer(AnswerValue::Choices(selected))
    }

    pub fn next(&mut self) -> Result<StepOutcome, QuestionnaireError> {
        if !self.is_answered() {
            return Err(QuestionnaireError::NotAnswered(self.current_question().id));
        }
        if self.is_last_step() {
            tracing::debug!(answered = self.answers.len(), "Questionnaire complete");
            return Ok(StepOutcome::Complete(self.answers.clone()));
        }
        self.step += 1;
        Ok(StepOutcome::Advanced(self.step))
    }

    /// No-op on the first step.
    pub fn previous(&mut self) {
        self.step = self.step.saturating_sub(1);
    }

    /// Percentage through the questionnaire counting the current step, rounded.
    pub fn progress_percent(&self) -> u8 {
        let total = self.total_steps();
        (((self.step + 1) * 100 + total / 2) / total) as u8
    }

    /// Clear all answers and return to the first question.
    pub fn restart(&mut self) {
        self.step = 0;
        self.answers.clear();
    }
}
