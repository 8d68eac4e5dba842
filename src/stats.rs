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

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::card::Card;
use crate::types::card::DEFAULT_EASE_FACTOR;
use crate::types::stage::Stage;
use crate::types::timestamp::Timestamp;

/// Share of cards a learner is assumed to retain in the long run.
const ASSUMED_RETENTION: f64 = 0.85;

/// How much longer mastering the backlog takes than first seeing it.
const MASTERY_FACTOR: f64 = 2.5;

/// Minutes spent on each new card.
const MINUTES_PER_NEW_CARD: f64 = 2.0;

/// Minutes spent on each review.
const MINUTES_PER_REVIEW: f64 = 0.5;

/// Aggregate counts over a collection of cards.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total: usize,
    pub new: usize,
    pub learning: usize,
    pub reviewing: usize,
    pub mastered: usize,
    /// Cards due by the end of the current local day.
    pub due_today: usize,
    /// Rounded to two decimal places.
    pub average_ease_factor: f64,
    pub total_reviews: u64,
}

impl Statistics {
    /// Cards that have been studied at least once.
    pub fn learned(&self) -> usize {
        self.learning + self.reviewing + self.mastered
    }
}

pub fn statistics(cards: &[Card], now: Timestamp) -> Statistics {
    let end_of_day = now.end_of_local_day();
    let mut stats = Statistics {
        total: cards.len(),
        new: 0,
        learning: 0,
        reviewing: 0,
        mastered: 0,
        due_today: 0,
        average_ease_factor: DEFAULT_EASE_FACTOR,
        total_reviews: 0,
    };
    let mut ease_factor_sum = 0.0;
    for card in cards {
        match card.stage {
            Stage::New => stats.new += 1,
            Stage::Learning => stats.learning += 1,
            Stage::Reviewing => stats.reviewing += 1,
            Stage::Mastered => stats.mastered += 1,
        }
        if card.next_review_date.is_some_and(|d| d <= end_of_day) {
            stats.due_today += 1;
        }
        ease_factor_sum += card.ease_factor;
        stats.total_reviews += card.total_reviews as u64;
    }
    if !cards.is_empty() {
        let mean = ease_factor_sum / cards.len() as f64;
        stats.average_ease_factor = (mean * 100.0).round() / 100.0;
    }
    stats
}

/// Statistics as saved alongside a list's progress.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStats {
    #[serde(flatten)]
    pub statistics: Statistics,
    /// Accumulated study time, in seconds.
    #[serde(default)]
    pub total_study_time: u64,
    #[serde(default)]
    pub last_study_date: Option<Timestamp>,
    /// Consecutive local days with at least one study session, ending on
    /// `last_study_date`.
    #[serde(default)]
    pub streak_days: u32,
}

/// The streak after a session at `now`: unchanged on the same day, one
/// longer on the day after the last session, otherwise restarted.
pub fn next_streak(previous: Option<&ListStats>, now: Timestamp) -> u32 {
    let today = now.local_date();
    let last = previous.and_then(|p| p.last_study_date.map(|d| (d.local_date(), p.streak_days)));
    match last {
        Some((day, streak)) if day == today => streak.max(1),
        Some((day, streak)) if day.succ_opt() == Some(today) => streak.max(1).saturating_add(1),
        _ => 1,
    }
}

/// The streak as seen at `now`. It lapses once a whole day passes without
/// studying.
pub fn current_streak(stats: &ListStats, now: Timestamp) -> u32 {
    let today = now.local_date();
    match stats.last_study_date.map(Timestamp::local_date) {
        Some(day) if day == today || day.succ_opt() == Some(today) => stats.streak_days.max(1),
        _ => 0,
    }
}

/// A rough forecast of how long the remaining work will take. Advisory
/// only.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub days_to_finish_new_cards: u64,
    pub estimated_days_to_mastery: u64,
    pub projected_mastered_words: u64,
    /// In minutes.
    pub recommended_daily_study_time: u64,
}

pub fn predict_progress(
    cards: &[Card],
    daily_new_cards: u32,
    daily_reviews: u32,
) -> Fallible<Projection> {
    if daily_new_cards == 0 {
        return Err(ErrorReport::validation(
            "daily new card count must be positive.",
        ));
    }
    let remaining_new = cards.iter().filter(|c| c.stage == Stage::New).count() as u64;
    let days_to_finish_new_cards = remaining_new.div_ceil(daily_new_cards as u64);
    let estimated_days_to_mastery = (days_to_finish_new_cards as f64 * MASTERY_FACTOR).ceil() as u64;
    let projected_mastered_words = (cards.len() as f64 * ASSUMED_RETENTION).floor() as u64;
    let minutes = daily_new_cards as f64 * MINUTES_PER_NEW_CARD + daily_reviews as f64 * MINUTES_PER_REVIEW;
    let recommended_daily_study_time = (minutes / 60.0).ceil() as u64;
    Ok(Projection {
        days_to_finish_new_cards,
        estimated_days_to_mastery,
        projected_mastered_words,
        recommended_daily_study_time,
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::error::ErrorKind;

    fn deck(stages: &[Stage]) -> Vec<Card> {
        stages
            .iter()
            .enumerate()
            .map(|(i, stage)| {
                let mut card = Card::new(format!("ket_{i}"), "ket");
                card.stage = *stage;
                card
            })
            .collect()
    }

    #[test]
    fn test_empty() {
        let stats = statistics(&[], Timestamp::now());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_ease_factor, 2.5);
        assert_eq!(stats.due_today, 0);
    }

    #[test]
    fn test_counts() {
        let now = Timestamp::now();
        let mut cards = deck(&[
            Stage::New,
            Stage::New,
            Stage::Learning,
            Stage::Reviewing,
            Stage::Mastered,
        ]);
        cards[2].next_review_date = Some(now.plus_minutes(-5));
        cards[2].total_reviews = 3;
        cards[3].next_review_date = Some(now.plus_hours(24.0 * 3.0));
        cards[3].total_reviews = 4;
        cards[4].ease_factor = 2.81;
        let stats = statistics(&cards, now);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.new, 2);
        assert_eq!(stats.learning, 1);
        assert_eq!(stats.reviewing, 1);
        assert_eq!(stats.mastered, 1);
        assert_eq!(stats.learned(), 3);
        // Never-scheduled cards are not counted as due today.
        assert_eq!(stats.due_today, 1);
        assert_eq!(stats.total_reviews, 7);
        // (2.5 * 4 + 2.81) / 5 = 2.562
        assert_eq!(stats.average_ease_factor, 2.56);
    }

    #[test]
    fn test_due_later_today() {
        let now = Timestamp::now();
        let mut cards = deck(&[Stage::Learning]);
        cards[0].next_review_date = Some(now.end_of_local_day());
        assert_eq!(statistics(&cards, now).due_today, 1);
    }

    fn studied_on(day: Timestamp, streak_days: u32) -> ListStats {
        ListStats {
            statistics: statistics(&[], day),
            total_study_time: 0,
            last_study_date: Some(day),
            streak_days,
        }
    }

    #[test]
    fn test_streak() {
        let now = Timestamp::now();
        let yesterday = now.end_of_local_day().plus_hours(-30.0);
        let two_days_ago = now.end_of_local_day().plus_hours(-54.0);

        assert_eq!(next_streak(None, now), 1);
        assert_eq!(next_streak(Some(&studied_on(now, 4)), now), 4);
        assert_eq!(next_streak(Some(&studied_on(yesterday, 4)), now), 5);
        assert_eq!(next_streak(Some(&studied_on(two_days_ago, 4)), now), 1);
        // Stats saved before streaks were tracked.
        assert_eq!(next_streak(Some(&studied_on(yesterday, 0)), now), 2);

        assert_eq!(current_streak(&studied_on(now, 3), now), 3);
        assert_eq!(current_streak(&studied_on(yesterday, 3), now), 3);
        assert_eq!(current_streak(&studied_on(two_days_ago, 3), now), 0);
    }

    #[test]
    fn test_projection() -> Fallible<()> {
        let mut stages = vec![Stage::New; 45];
        stages.extend([Stage::Mastered; 55]);
        let projection = predict_progress(&deck(&stages), 20, 100)?;
        assert_eq!(projection.days_to_finish_new_cards, 3);
        assert_eq!(projection.estimated_days_to_mastery, 8);
        assert_eq!(projection.projected_mastered_words, 85);
        // (20 * 2 + 100 * 0.5) / 60 = 1.5
        assert_eq!(projection.recommended_daily_study_time, 2);
        Ok(())
    }

    #[test]
    fn test_projection_rejects_zero_throughput() {
        let err = predict_progress(&deck(&[Stage::New]), 0, 100).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    proptest! {
        #[test]
        fn prop_stage_counts_sum_to_total(indices in prop::collection::vec(0usize..4, 0..200)) {
            let stages: Vec<Stage> = indices.into_iter().map(|i| Stage::ALL[i]).collect();
            let cards = deck(&stages);
            let stats = statistics(&cards, Timestamp::now());
            prop_assert_eq!(stats.new + stats.learning + stats.reviewing + stats.mastered, cards.len());
        }
    }
}
