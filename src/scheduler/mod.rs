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

//! The rating-driven state transition at the heart of the trainer.
//!
//! This is a variant of SM-2. Every card carries an ease factor, an interval
//! in days and a count of consecutive successful reviews. A rating of
//! "Again" sends the card back to learning and shows it again in a few
//! minutes. The other ratings grow the interval: the first two successful
//! reviews use fixed bootstrap intervals, after which the interval is
//! multiplied by the ease factor. "Hard" and "Easy" also nudge the ease
//! factor down and up, within fixed bounds.

pub mod jitter;

use crate::error::Fallible;
use crate::scheduler::jitter::FixedJitter;
use crate::scheduler::jitter::Jitter;
use crate::types::card::Card;
use crate::types::card::MAX_EASE_FACTOR;
use crate::types::card::MAX_INTERVAL;
use crate::types::card::MIN_EASE_FACTOR;
use crate::types::rating::Rating;
use crate::types::stage::Stage;
use crate::types::timestamp::Timestamp;

/// How long until a forgotten card is shown again.
pub const AGAIN_DELAY_MINUTES: i64 = 10;

/// Ease factor lost on a "Hard" rating.
pub const HARD_EASE_PENALTY: f64 = 0.15;

/// Ease factor gained on an "Easy" rating.
pub const EASY_EASE_BONUS: f64 = 0.15;

/// Interval growth on a "Hard" rating.
pub const HARD_INTERVAL_MULTIPLIER: f64 = 1.2;

/// Extra interval growth on an "Easy" rating, on top of the ease factor.
pub const EASY_INTERVAL_MULTIPLIER: f64 = 1.3;

/// Repetitions after which a "Good" rating moves the card to reviewing.
pub const REVIEWING_REPETITIONS: u32 = 3;

/// Minimum interval, in days, for a card to be mastered.
pub const MASTERED_INTERVAL: u32 = 30;

/// Minimum repetitions for a card to be mastered.
pub const MASTERED_REPETITIONS: u32 = 5;

/// Compute a card's next state after the learner rates it at `now`.
///
/// The input is left untouched. Persisting the result is the caller's job.
pub fn apply_rating(card: &Card, rating: Rating, now: Timestamp, jitter: &mut dyn Jitter) -> Card {
    let mut next = card.clone();
    match rating {
        Rating::Again => {
            next.repetitions = 0;
            next.interval = 1;
            next.stage = Stage::Learning;
            next.next_review_date = Some(now.plus_minutes(AGAIN_DELAY_MINUTES));
        }
        Rating::Hard => {
            next.ease_factor = (next.ease_factor - HARD_EASE_PENALTY).max(MIN_EASE_FACTOR);
            next.interval = grow(next.interval, HARD_INTERVAL_MULTIPLIER);
            next.repetitions = next.repetitions.saturating_add(1);
            next.stage = Stage::Learning;
            next.next_review_date = Some(schedule_from(now, next.interval, jitter));
        }
        Rating::Good => {
            next.interval = match next.repetitions {
                0 => 1,
                1 => 6,
                _ => grow(next.interval, next.ease_factor),
            };
            next.repetitions = next.repetitions.saturating_add(1);
            next.stage = if next.repetitions >= REVIEWING_REPETITIONS {
                Stage::Reviewing
            } else {
                Stage::Learning
            };
            next.next_review_date = Some(schedule_from(now, next.interval, jitter));
        }
        Rating::Easy => {
            next.ease_factor = (next.ease_factor + EASY_EASE_BONUS).min(MAX_EASE_FACTOR);
            next.interval = match next.repetitions {
                0 => 4,
                1 => 10,
                _ => grow(next.interval, next.ease_factor * EASY_INTERVAL_MULTIPLIER),
            };
            next.repetitions = next.repetitions.saturating_add(1);
            next.stage = if is_mastered(next.interval, next.repetitions) {
                Stage::Mastered
            } else {
                Stage::Reviewing
            };
            next.next_review_date = Some(schedule_from(now, next.interval, jitter));
        }
    }
    next.last_review_date = Some(now);
    next.last_rating = Some(rating);
    next.total_reviews = next.total_reviews.saturating_add(1);
    next
}

/// Like [`apply_rating`], for a rating that hasn't been validated yet.
///
/// Fails without producing a new state if `rating` is not 1 through 4.
pub fn apply_raw_rating(
    card: &Card,
    rating: i64,
    now: Timestamp,
    jitter: &mut dyn Jitter,
) -> Fallible<Card> {
    let rating = Rating::try_from(rating)?;
    Ok(apply_rating(card, rating, now, jitter))
}

/// The instant `interval_days` after `base`, stretched or shrunk by the
/// jitter factor.
pub fn schedule_from(base: Timestamp, interval_days: u32, jitter: &mut dyn Jitter) -> Timestamp {
    let hours = interval_days as f64 * 24.0 * jitter.factor();
    base.plus_hours(hours)
}

/// The interval, in days, each rating would give the card. Used to label
/// the rating choices.
pub fn preview_intervals(card: &Card) -> [(Rating, u32); 4] {
    let mut no_jitter = FixedJitter::none();
    let now = Timestamp::now();
    Rating::ALL.map(|rating| (rating, apply_rating(card, rating, now, &mut no_jitter).interval))
}

fn is_mastered(interval: u32, repetitions: u32) -> bool {
    interval >= MASTERED_INTERVAL && repetitions >= MASTERED_REPETITIONS
}

/// Multiply an interval, rounding up, within `1..=MAX_INTERVAL`.
fn grow(interval: u32, multiplier: f64) -> u32 {
    let grown = (interval as f64 * multiplier).ceil();
    if grown >= MAX_INTERVAL as f64 {
        MAX_INTERVAL
    } else {
        (grown as u32).max(1)
    }
}
