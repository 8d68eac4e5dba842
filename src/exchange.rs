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

//! Moving progress in and out of the trainer as JSON documents.

use serde::Serialize;
use serde_json::Value;

use crate::db::Database;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::stats::ListStats;
use crate::stats::Statistics;
use crate::stats::statistics;
use crate::types::card::Card;
use crate::types::record::normalize_value;
use crate::types::timestamp::Timestamp;
use crate::vocab::lists::ListRegistry;
use crate::vocab::lists::VocabList;

/// The version tag written into every export.
pub const EXPORT_VERSION: &str = "1.0";

/// A snapshot of a collection of cards.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Export<'a> {
    pub export_date: Timestamp,
    pub version: &'static str,
    pub statistics: Statistics,
    pub cards: &'a [Card],
}

pub fn export_data(cards: &[Card], now: Timestamp) -> Export<'_> {
    Export {
        export_date: now,
        version: EXPORT_VERSION,
        statistics: statistics(cards, now),
        cards,
    }
}

/// Read the cards out of an export.
///
/// The payload must be an object with a `cards` array. Every card is
/// normalized: missing fields take their defaults and dates are parsed.
/// Nothing is returned unless every card is valid.
pub fn import_data(payload: &Value) -> Fallible<Vec<Card>> {
    let records = match payload.get("cards") {
        Some(Value::Array(records)) => records,
        Some(_) => {
            return Err(ErrorReport::validation(
                "invalid import data format: \"cards\" is not an array.",
            ));
        }
        None => {
            return Err(ErrorReport::validation(
                "invalid import data format: missing \"cards\".",
            ));
        }
    };
    normalize_all(records, "")
}

/// Parse an export from its JSON text.
pub fn import_json(text: &str) -> Fallible<Vec<Card>> {
    let payload: Value = serde_json::from_str(text)
        .map_err(|e| ErrorReport::validation(format!("import file is not valid JSON: {e}")))?;
    import_data(&payload)
}

fn normalize_all(records: &[Value], fallback_list_id: &str) -> Fallible<Vec<Card>> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            normalize_value(record.clone(), fallback_list_id)
                .map_err(|e| e.context(format_args!("card #{}", i + 1)))
        })
        .collect()
}

/// Everything saved for a single list.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProgressExport {
    pub list_id: String,
    pub list_config: Option<VocabList>,
    pub progress: Option<Vec<Card>>,
    pub stats: Option<ListStats>,
    pub export_date: Timestamp,
    pub version: &'static str,
}

pub fn export_list_progress(
    db: &Database,
    registry: &ListRegistry,
    list_id: &str,
    now: Timestamp,
) -> Fallible<ListProgressExport> {
    Ok(ListProgressExport {
        list_id: list_id.to_string(),
        list_config: registry.get(list_id).cloned(),
        progress: db.load_progress(list_id)?,
        stats: db.load_list_stats(list_id)?,
        export_date: now,
        version: EXPORT_VERSION,
    })
}

/// Restore a list's progress from a [`ListProgressExport`] payload,
/// replacing whatever was saved before. Returns the list id.
pub fn import_list_progress(
    db: &mut Database,
    registry: &ListRegistry,
    payload: &Value,
) -> Fallible<String> {
    let list_id = match payload.get("listId") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        _ => return Err(ErrorReport::validation("invalid import data format: missing \"listId\".")),
    };
    let records = match payload.get("progress") {
        Some(Value::Array(records)) => records,
        _ => {
            return Err(ErrorReport::validation(
                "invalid import data format: missing \"progress\".",
            ));
        }
    };
    if !registry.exists(&list_id) {
        return Err(ErrorReport::validation(format!(
            "list {list_id:?} does not exist."
        )));
    }
    let cards = normalize_all(records, &list_id)?;
    let stats: Option<ListStats> = match payload.get("stats") {
        None | Some(Value::Null) => None,
        Some(stats) => Some(
            serde_json::from_value(stats.clone())
                .map_err(|e| ErrorReport::validation(format!("invalid stats: {e}")))?,
        ),
    };
    db.save_progress(&list_id, &cards)?;
    if let Some(stats) = stats {
        db.save_list_stats(&list_id, &stats)?;
    }
    log::info!("Imported {} cards into list {list_id:?}", cards.len());
    Ok(list_id)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;
    use crate::scheduler::apply_rating;
    use crate::scheduler::jitter::FixedJitter;
    use crate::types::rating::Rating;

    fn studied_cards() -> Vec<Card> {
        let now = Timestamp::now();
        let mut jitter = FixedJitter(1.07);
        let mut cards: Vec<Card> = (1..=4).map(|i| Card::new(format!("ket_{i}"), "ket")).collect();
        cards[0] = apply_rating(&cards[0], Rating::Good, now, &mut jitter);
        cards[1] = apply_rating(&cards[1], Rating::Again, now, &mut jitter);
        cards[2] = apply_rating(&cards[2], Rating::Easy, now, &mut jitter);
        cards[2] = apply_rating(&cards[2], Rating::Hard, now, &mut jitter);
        cards[3].is_difficult = true;
        cards
    }

    fn registry() -> ListRegistry {
        ListRegistry::from_toml(
            "[[lists]]\nid = \"ket\"\ndisplay_name = \"KET\"\ncsv_file = \"ket.csv\"\n",
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip() -> Fallible<()> {
        let cards = studied_cards();
        let payload = serde_json::to_value(export_data(&cards, Timestamp::now()))?;
        assert_eq!(payload["version"], "1.0");
        assert_eq!(payload["statistics"]["total"], 4);
        let imported = import_data(&payload)?;
        assert_eq!(imported, cards);
        Ok(())
    }

    #[test]
    fn test_round_trip_through_text() -> Fallible<()> {
        let cards = studied_cards();
        let text = serde_json::to_string_pretty(&export_data(&cards, Timestamp::now()))?;
        assert_eq!(import_json(&text)?, cards);
        Ok(())
    }

    #[test]
    fn test_missing_cards() {
        let err = import_data(&json!({ "version": "1.0" })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_cards_not_an_array() {
        let err = import_data(&json!({ "cards": { "id": "ket_1" } })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_not_json() {
        let err = import_json("{ cards: ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_one_bad_card_rejects_everything() {
        let payload = json!({ "cards": [{ "id": "ket_1" }, { "stage": "new" }] });
        let err = import_data(&payload).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.message().contains("card #2"));
    }

    #[test]
    fn test_bad_last_rating_is_an_invalid_rating() {
        let payload = json!({ "cards": [{ "id": "ket_1", "lastRating": 9 }] });
        let err = import_data(&payload).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRating);
        assert!(err.message().starts_with("card #1: "));
    }

    #[test]
    fn test_legacy_records_are_normalized() -> Fallible<()> {
        let payload = json!({
            "cards": [{
                "id": "ket_7",
                "listId": "ket",
                "english": "tree",
                "exportNote": "Generated elsewhere",
                "nextReviewDate": "2025-02-03T04:05:06.789Z"
            }]
        });
        let cards = import_data(&payload)?;
        assert_eq!(cards[0].ease_factor, 2.5);
        assert_eq!(cards[0].interval, 1);
        assert_eq!(
            cards[0].next_review_date,
            Some(Timestamp::parse("2025-02-03T04:05:06.789Z")?)
        );
        Ok(())
    }

    #[test]
    fn test_list_progress_round_trip() -> Fallible<()> {
        let registry = registry();
        let mut db = Database::in_memory()?;
        let cards = studied_cards();
        db.save_progress("ket", &cards)?;
        let export = export_list_progress(&db, &registry, "ket", Timestamp::now())?;
        let payload = serde_json::to_value(&export)?;
        assert_eq!(payload["listConfig"]["displayName"], "KET");

        let mut other = Database::in_memory()?;
        let list_id = import_list_progress(&mut other, &registry, &payload)?;
        assert_eq!(list_id, "ket");
        assert_eq!(other.load_progress("ket")?, Some(cards));
        Ok(())
    }

    #[test]
    fn test_list_progress_unknown_list() -> Fallible<()> {
        let mut db = Database::in_memory()?;
        let payload = json!({ "listId": "c2", "progress": [] });
        let err = import_list_progress(&mut db, &registry(), &payload).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(db.load_progress("c2")?.is_none());
        Ok(())
    }

    #[test]
    fn test_list_progress_missing_fields() -> Fallible<()> {
        let mut db = Database::in_memory()?;
        let registry = registry();
        assert!(import_list_progress(&mut db, &registry, &json!({ "progress": [] })).is_err());
        assert!(import_list_progress(&mut db, &registry, &json!({ "listId": "ket" })).is_err());
        assert!(db.load_progress("ket")?.is_none());
        Ok(())
    }
}
