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

//! Read-only selections over a collection of cards.
//!
//! Every query preserves the relative order of its input unless it says
//! otherwise.

use std::cmp::Ordering;

use serde::Serialize;

use crate::types::card::Card;
use crate::types::rating::Rating;
use crate::types::stage::Stage;
use crate::types::timestamp::Timestamp;
use crate::vocab::lists::VocabList;

/// Cards with an ease factor below this are difficult.
pub const DIFFICULT_EASE_FACTOR: f64 = 2.0;

/// Cards still learning after this many repetitions are difficult.
pub const DIFFICULT_REPETITIONS: u32 = 5;

/// Cards due for review at `now`.
pub fn due_cards(cards: &[Card], now: Timestamp) -> Vec<&Card> {
    cards.iter().filter(|card| card.is_due(now)).collect()
}

/// The first `limit` cards that have never been studied.
pub fn new_cards(cards: &[Card], limit: usize) -> Vec<&Card> {
    cards
        .iter()
        .filter(|card| card.stage == Stage::New)
        .take(limit)
        .collect()
}

/// Whether the learner is struggling with a card.
pub fn is_difficult(card: &Card) -> bool {
    card.ease_factor < DIFFICULT_EASE_FACTOR
        || (card.repetitions >= DIFFICULT_REPETITIONS && card.stage == Stage::Learning)
        || card.last_rating.is_some_and(|r| r <= Rating::Hard)
}

/// Difficult cards, hardest (lowest ease factor) first. Ties keep their
/// input order.
pub fn difficult_cards(cards: &[Card]) -> Vec<&Card> {
    let mut difficult: Vec<&Card> = cards.iter().filter(|card| is_difficult(card)).collect();
    difficult.sort_by(|a, b| {
        a.ease_factor
            .partial_cmp(&b.ease_factor)
            .unwrap_or(Ordering::Equal)
    });
    difficult
}

/// How many cards were last reviewed on the local calendar day of `now`.
pub fn studied_today(cards: &[Card], now: Timestamp) -> usize {
    let today = now.local_date();
    cards
        .iter()
        .filter(|card| card.last_review_date.is_some_and(|d| d.local_date() == today))
        .count()
}

/// How far the learner has come in one list.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOverview {
    pub list_id: String,
    pub display_name: String,
    pub total_words: usize,
    /// Words rated at least once.
    pub words_learned: usize,
    pub words_mastered: usize,
}

/// Summarize a list from its saved cards. The word count comes from the
/// saved cards when there are any, and from the list definition otherwise.
pub fn list_overview(list: &VocabList, cards: &[Card]) -> ListOverview {
    let total_words = if cards.is_empty() {
        list.total_words
    } else {
        cards.len()
    };
    ListOverview {
        list_id: list.id.clone(),
        display_name: list.display_name.clone(),
        total_words,
        words_learned: cards.iter().filter(|c| c.total_reviews > 0).count(),
        words_mastered: cards.iter().filter(|c| c.stage == Stage::Mastered).count(),
    }
}
