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
use serde_json::Value;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::card::Card;
use crate::types::card::DEFAULT_EASE_FACTOR;
use crate::types::card::DEFAULT_INTERVAL;
use crate::types::card::MAX_INTERVAL;
use crate::types::card::MAX_EASE_FACTOR;
use crate::types::card::MIN_EASE_FACTOR;
use crate::types::rating::Rating;
use crate::types::stage::Stage;
use crate::types::timestamp::Timestamp;

/// A card as it appears in stored progress or an import file, where any
/// field may be missing, null, or written by an older version.
///
/// Unknown fields (word text, export notes) are ignored.
#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub id: Option<Value>,
    pub list_id: Option<String>,
    pub stage: Option<String>,
    pub ease_factor: Option<f64>,
    pub interval: Option<f64>,
    pub repetitions: Option<f64>,
    pub next_review_date: Option<DateValue>,
    pub last_review_date: Option<DateValue>,
    pub total_reviews: Option<f64>,
    pub is_difficult: Option<bool>,
    pub last_rating: Option<i64>,
}

/// A date as written by any past writer: an RFC 3339 string, or
/// milliseconds since the epoch.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum DateValue {
    Millis(i64),
    Text(String),
}

impl DateValue {
    fn into_timestamp(self) -> Fallible<Timestamp> {
        match self {
            DateValue::Millis(millis) => Timestamp::from_millis(millis).ok_or_else(|| {
                ErrorReport::validation(format!("timestamp out of range: {millis}"))
            }),
            DateValue::Text(text) => Timestamp::parse(&text),
        }
    }
}

impl CardRecord {
    /// Parse a record from an arbitrary JSON value.
    pub fn from_value(value: Value) -> Fallible<Self> {
        if !value.is_object() {
            return Err(ErrorReport::validation("card record is not an object."));
        }
        serde_json::from_value(value)
            .map_err(|e| ErrorReport::validation(format!("malformed card record: {e}")))
    }

    /// Fill in defaults and coerce every field into its canonical form.
    ///
    /// Zero, missing and null numeric fields all take the default for a new
    /// card. The ease factor is clamped into its bounds and the interval is
    /// raised to at least one day, so that everything downstream can rely on
    /// the card invariants.
    pub fn normalize(self, fallback_list_id: &str) -> Fallible<Card> {
        let id = match self.id {
            Some(Value::String(id)) if !id.trim().is_empty() => id,
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(ErrorReport::validation("card record has no id.")),
        };
        let list_id = self
            .list_id
            .unwrap_or_else(|| fallback_list_id.to_string());
        let stage = match self.stage.as_deref() {
            None | Some("") => Stage::New,
            Some(stage) => Stage::try_from(stage)?,
        };
        let ease_factor = match self.ease_factor {
            Some(ef) if ef.is_finite() && ef != 0.0 => ef.clamp(MIN_EASE_FACTOR, MAX_EASE_FACTOR),
            _ => DEFAULT_EASE_FACTOR,
        };
        let interval = match self.interval {
            Some(days) if days.is_finite() && days >= 1.0 => {
                days.round().min(MAX_INTERVAL as f64) as u32
            }
            _ => DEFAULT_INTERVAL,
        };
        let next_review_date = self
            .next_review_date
            .map(DateValue::into_timestamp)
            .transpose()?;
        let last_review_date = self
            .last_review_date
            .map(DateValue::into_timestamp)
            .transpose()?;
        let last_rating = self.last_rating.map(Rating::try_from).transpose()?;
        Ok(Card {
            id,
            list_id,
            stage,
            ease_factor,
            interval,
            repetitions: count(self.repetitions),
            next_review_date,
            last_review_date,
            total_reviews: count(self.total_reviews),
            is_difficult: self.is_difficult.unwrap_or(false),
            last_rating,
        })
    }
}

fn count(value: Option<f64>) -> u32 {
    match value {
        Some(n) if n.is_finite() && n > 0.0 => n.round() as u32,
        _ => 0,
    }
}

/// Parse and normalize a single card from a JSON value.
pub fn normalize_value(value: Value, fallback_list_id: &str) -> Fallible<Card> {
    CardRecord::from_value(value)?.normalize(fallback_list_id)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_bare_record_gets_defaults() -> Fallible<()> {
        let card = normalize_value(json!({ "id": "ket_3" }), "ket")?;
        assert_eq!(card, Card::new("ket_3", "ket"));
        Ok(())
    }

    #[test]
    fn test_zero_fields_get_defaults() -> Fallible<()> {
        let card = normalize_value(
            json!({
                "id": "b1_9",
                "listId": "b1",
                "easeFactor": 0,
                "interval": 0,
                "repetitions": null,
                "stage": ""
            }),
            "ket",
        )?;
        assert_eq!(card, Card::new("b1_9", "b1"));
        Ok(())
    }

    #[test]
    fn test_full_record() -> Fallible<()> {
        let card = normalize_value(
            json!({
                "id": "ket_1",
                "listId": "ket",
                "english": "apple",
                "chinese": "蘋果",
                "stage": "reviewing",
                "easeFactor": 2.35,
                "interval": 15,
                "repetitions": 3,
                "nextReviewDate": "2025-05-01T12:00:00.000Z",
                "lastReviewDate": 1_746_000_000_000_i64,
                "totalReviews": 4,
                "isDifficult": true,
                "lastRating": 2
            }),
            "",
        )?;
        assert_eq!(card.stage, Stage::Reviewing);
        assert_eq!(card.ease_factor, 2.35);
        assert_eq!(card.interval, 15);
        assert_eq!(card.repetitions, 3);
        assert_eq!(card.total_reviews, 4);
        assert!(card.is_difficult);
        assert_eq!(card.last_rating, Some(Rating::Hard));
        assert_eq!(
            card.next_review_date,
            Some(Timestamp::parse("2025-05-01T12:00:00Z")?)
        );
        assert_eq!(
            card.last_review_date.map(|ts| ts.millis()),
            Some(1_746_000_000_000)
        );
        Ok(())
    }

    #[test]
    fn test_out_of_bounds_ease_factor_is_clamped() -> Fallible<()> {
        let low = normalize_value(json!({ "id": "a", "easeFactor": 0.5 }), "")?;
        let high = normalize_value(json!({ "id": "b", "easeFactor": 9.0 }), "")?;
        assert_eq!(low.ease_factor, MIN_EASE_FACTOR);
        assert_eq!(high.ease_factor, MAX_EASE_FACTOR);
        Ok(())
    }

    #[test]
    fn test_missing_id() {
        let err = normalize_value(json!({ "stage": "new" }), "ket").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_not_an_object() {
        let err = normalize_value(json!([1, 2, 3]), "ket").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_bad_date() {
        let err = normalize_value(json!({ "id": "a", "nextReviewDate": "soon" }), "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_bad_stage() {
        let err = normalize_value(json!({ "id": "a", "stage": "forgotten" }), "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_bad_last_rating() {
        let err = normalize_value(json!({ "id": "a", "lastRating": 0 }), "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRating);
    }
}
