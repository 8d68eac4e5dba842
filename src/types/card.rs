// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::Deserialize;
use serde::Serialize;

use crate::types::rating::Rating;
use crate::types::stage::Stage;
use crate::types::timestamp::Timestamp;

/// The ease factor every card starts with.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// The lowest ease factor a card can have.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// The highest ease factor a card can have.
pub const MAX_EASE_FACTOR: f64 = 3.0;

/// The review interval, in days, every card starts with.
pub const DEFAULT_INTERVAL: u32 = 1;

/// The longest review interval, in days, a card can be given.
pub const MAX_INTERVAL: u32 = 36_500;

/// The learning state of a single vocabulary item.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Stable identifier, unique within the whole store.
    pub id: String,
    /// The vocabulary list this card belongs to.
    pub list_id: String,
    pub stage: Stage,
    /// Governs how quickly the interval grows. Always within
    /// [`MIN_EASE_FACTOR`, `MAX_EASE_FACTOR`].
    pub ease_factor: f64,
    /// Days until the next review. Always at least 1.
    pub interval: u32,
    /// Consecutive successful reviews since the last "Again".
    pub repetitions: u32,
    /// When the card is next due. `None` means the card has never been
    /// reviewed and is due now.
    pub next_review_date: Option<Timestamp>,
    pub last_review_date: Option<Timestamp>,
    /// Number of ratings ever applied to this card.
    pub total_reviews: u32,
    /// Set manually by the learner, independent of scheduling.
    pub is_difficult: bool,
    pub last_rating: Option<Rating>,
}

impl Card {
    pub fn new(id: impl Into<String>, list_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            list_id: list_id.into(),
            stage: Stage::New,
            ease_factor: DEFAULT_EASE_FACTOR,
            interval: DEFAULT_INTERVAL,
            repetitions: 0,
            next_review_date: None,
            last_review_date: None,
            total_reviews: 0,
            is_difficult: false,
            last_rating: None,
        }
    }

    /// A card is due if it has never been scheduled, or its review date has
    /// passed.
    pub fn is_due(&self, now: Timestamp) -> bool {
        match self.next_review_date {
            None => true,
            Some(date) => date <= now,
        }
    }

    /// Discard all scheduling progress, keeping only the card's identity.
    pub fn reset(&mut self) {
        *self = Card::new(std::mem::take(&mut self.id), std::mem::take(&mut self.list_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_card() {
        let card = Card::new("ket_1", "ket");
        assert_eq!(card.stage, Stage::New);
        assert_eq!(card.ease_factor, 2.5);
        assert_eq!(card.interval, 1);
        assert_eq!(card.repetitions, 0);
        assert_eq!(card.total_reviews, 0);
        assert!(card.next_review_date.is_none());
        assert!(card.last_review_date.is_none());
        assert!(card.last_rating.is_none());
        assert!(!card.is_difficult);
    }

    #[test]
    fn test_never_reviewed_is_due() {
        let card = Card::new("ket_1", "ket");
        assert!(card.is_due(Timestamp::now()));
    }

    #[test]
    fn test_reset() {
        let mut card = Card::new("ket_1", "ket");
        card.stage = Stage::Mastered;
        card.repetitions = 7;
        card.interval = 90;
        card.is_difficult = true;
        card.reset();
        assert_eq!(card, Card::new("ket_1", "ket"));
    }

    #[test]
    fn test_serialize_field_names() -> crate::error::Fallible<()> {
        let card = Card::new("ket_1", "ket");
        let json = serde_json::to_value(&card)?;
        assert_eq!(json["listId"], "ket");
        assert_eq!(json["easeFactor"], 2.5);
        assert_eq!(json["stage"], "new");
        assert!(json["nextReviewDate"].is_null());
        Ok(())
    }
}
