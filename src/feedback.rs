//! Star ratings a user gives each suggested condition during one session.
//!
//! Kept in memory only. Diagnostic history is never persisted.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::suggestions::Condition;

pub const MIN_STARS: u8 = 1;
pub const MAX_STARS: u8 = 5;

#[derive(Error, Debug, PartialEq)]
pub enum FeedbackError {
    #[error("Rating must be between {min} and {max} stars, got {stars}")]
    OutOfRange { stars: u8, min: u8, max: u8 },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedbackLedger {
    ratings: BTreeMap<Condition, u8>,
}

impl FeedbackLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rate a condition; a later rating replaces the earlier one.
    pub fn rate(&mut self, condition: Condition, stars: u8) -> Result<(), FeedbackError> {
        if !(MIN_STARS..=MAX_STARS).contains(&stars) {
            return Err(FeedbackError::OutOfRange {
                stars,
                min: MIN_STARS,
                max: MAX_STARS,
            });
        }
        self.ratings.insert(condition, stars);
        tracing::info!(condition = condition.key(), stars, "Suggestion feedback recorded");
        Ok(())
    }

    pub fn rating(&self, condition: Condition) -> Option<u8> {
        self.ratings.get(&condition).copied()
    }

    pub fn ratings(&self) -> impl Iterator<Item = (Condition, u8)> + '_ {
        self.ratings.iter().map(|(c, s)| (*c, *s))
    }

    pub fn clear(&mut self) {
        self.ratings.clear();
    }
}
