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

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use serde_json::Value;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::settings::AppSettings;
use crate::stats::ListStats;
use crate::types::card::Card;
use crate::types::record::normalize_value;
use crate::types::timestamp::Timestamp;

const CURRENT_LIST_KEY: &str = "vocab-current-list";
const SETTINGS_KEY: &str = "vocab-app-settings";

fn progress_key(list_id: &str) -> String {
    format!("vocab-progress-{list_id}")
}

fn stats_key(list_id: &str) -> String {
    format!("vocab-stats-{list_id}")
}

/// A key-value store for learning progress, backed by SQLite. Values are
/// JSON documents.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let conn = Connection::open(database_path)?;
        Self::init(conn)
    }

    pub fn in_memory() -> Fallible<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(mut conn: Connection) -> Fallible<Self> {
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                log::debug!("Creating database schema.");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        Ok(Self { conn })
    }

    /// Load the saved progress of a list, or `None` if the list has never
    /// been saved.
    pub fn load_progress(&self, list_id: &str) -> Fallible<Option<Vec<Card>>> {
        let Some(json) = self.get(&progress_key(list_id))? else {
            return Ok(None);
        };
        let value: Value = serde_json::from_str(&json)?;
        let Value::Array(records) = value else {
            return Err(ErrorReport::validation(format!(
                "stored progress for list {list_id:?} is not an array."
            )));
        };
        let cards = records
            .into_iter()
            .map(|record| normalize_value(record, list_id))
            .collect::<Fallible<Vec<Card>>>()?;
        log::debug!("Loaded progress for {} cards in list {list_id:?}", cards.len());
        Ok(Some(cards))
    }

    pub fn save_progress(&mut self, list_id: &str, cards: &[Card]) -> Fallible<()> {
        let json = serde_json::to_string(cards)?;
        self.put(&progress_key(list_id), &json)?;
        log::debug!("Saved progress for {} cards in list {list_id:?}", cards.len());
        Ok(())
    }

    pub fn load_list_stats(&self, list_id: &str) -> Fallible<Option<ListStats>> {
        match self.get(&stats_key(list_id))? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn save_list_stats(&mut self, list_id: &str, stats: &ListStats) -> Fallible<()> {
        let json = serde_json::to_string(stats)?;
        self.put(&stats_key(list_id), &json)
    }

    /// When a list's progress was last saved.
    pub fn progress_updated_at(&self, list_id: &str) -> Fallible<Option<Timestamp>> {
        let sql = "select updated_at from entries where key = ?;";
        let ts: Option<Timestamp> = self
            .conn
            .query_row(sql, [progress_key(list_id)], |row| row.get(0))
            .optional()?;
        Ok(ts)
    }

    /// Forget everything learned in a list.
    pub fn clear_progress(&mut self, list_id: &str) -> Fallible<()> {
        let tx = self.conn.transaction()?;
        tx.execute("delete from entries where key = ?;", [progress_key(list_id)])?;
        tx.execute("delete from entries where key = ?;", [stats_key(list_id)])?;
        tx.commit()?;
        log::info!("Cleared progress for list {list_id:?}");
        Ok(())
    }

    /// Forget everything: progress for every list, settings, and the
    /// current list.
    pub fn reset_all(&mut self) -> Fallible<()> {
        self.conn.execute("delete from entries;", [])?;
        log::info!("Cleared all progress and settings.");
        Ok(())
    }

    pub fn load_settings(&self) -> Fallible<AppSettings> {
        match self.get(SETTINGS_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(AppSettings::default()),
        }
    }

    pub fn save_settings(&mut self, settings: &AppSettings) -> Fallible<()> {
        let json = serde_json::to_string(settings)?;
        self.put(SETTINGS_KEY, &json)
    }

    pub fn load_current_list(&self) -> Fallible<Option<String>> {
        self.get(CURRENT_LIST_KEY)
    }

    pub fn save_current_list(&mut self, list_id: &str) -> Fallible<()> {
        self.put(CURRENT_LIST_KEY, list_id)
    }

    fn get(&self, key: &str) -> Fallible<Option<String>> {
        let sql = "select value from entries where key = ?;";
        let value: Option<String> = self
            .conn
            .query_row(sql, [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn put(&mut self, key: &str, value: &str) -> Fallible<()> {
        let sql = "insert into entries (key, value, updated_at) values (?, ?, ?) on conflict (key) do update set value = excluded.value, updated_at = excluded.updated_at;";
        let tx = self.conn.transaction()?;
        tx.execute(sql, (key, value, Timestamp::now()))?;
        tx.commit()?;
        Ok(())
    }
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["entries"], |row| row.get(0))?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::stats::statistics;
    use crate::types::rating::Rating;
    use crate::types::stage::Stage;

    fn sample_cards() -> Vec<Card> {
        let mut a = Card::new("ket_1", "ket");
        a.stage = Stage::Reviewing;
        a.repetitions = 3;
        a.interval = 15;
        a.ease_factor = 2.35;
        a.total_reviews = 5;
        a.last_rating = Some(Rating::Good);
        a.last_review_date = Some(Timestamp::now());
        a.next_review_date = Some(Timestamp::now().plus_hours(24.0 * 15.0));
        vec![a, Card::new("ket_2", "ket")]
    }

    #[test]
    fn test_progress_round_trip() -> Fallible<()> {
        let mut db = Database::in_memory()?;
        assert!(db.load_progress("ket")?.is_none());
        let cards = sample_cards();
        db.save_progress("ket", &cards)?;
        assert_eq!(db.load_progress("ket")?, Some(cards));
        assert!(db.load_progress("b1")?.is_none());
        assert!(db.progress_updated_at("ket")?.is_some());
        Ok(())
    }

    #[test]
    fn test_save_overwrites() -> Fallible<()> {
        let mut db = Database::in_memory()?;
        db.save_progress("ket", &sample_cards())?;
        db.save_progress("ket", &[])?;
        assert_eq!(db.load_progress("ket")?, Some(vec![]));
        Ok(())
    }

    #[test]
    fn test_clear_progress() -> Fallible<()> {
        let mut db = Database::in_memory()?;
        let cards = sample_cards();
        db.save_progress("ket", &cards)?;
        db.save_progress("b1", &cards)?;
        let stats = ListStats {
            statistics: statistics(&cards, Timestamp::now()),
            total_study_time: 120,
            last_study_date: Some(Timestamp::now()),
            streak_days: 2,
        };
        db.save_list_stats("ket", &stats)?;
        assert_eq!(db.load_list_stats("ket")?, Some(stats));
        db.clear_progress("ket")?;
        assert!(db.load_progress("ket")?.is_none());
        assert!(db.load_list_stats("ket")?.is_none());
        assert!(db.load_progress("b1")?.is_some());
        Ok(())
    }

    #[test]
    fn test_settings() -> Fallible<()> {
        let mut db = Database::in_memory()?;
        assert_eq!(db.load_settings()?, AppSettings::default());
        let settings = AppSettings {
            daily_goal: 50,
            ..AppSettings::default()
        };
        db.save_settings(&settings)?;
        db.save_current_list("b1")?;
        assert_eq!(db.load_settings()?, settings);
        assert_eq!(db.load_current_list()?, Some("b1".to_string()));
        db.reset_all()?;
        assert_eq!(db.load_settings()?, AppSettings::default());
        assert!(db.load_current_list()?.is_none());
        Ok(())
    }

    #[test]
    fn test_reopen_file() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("vocabcards.db");
        let path = path.to_str().unwrap();
        {
            let mut db = Database::new(path)?;
            db.save_progress("ket", &sample_cards())?;
        }
        let db = Database::new(path)?;
        assert_eq!(db.load_progress("ket")?.map(|c| c.len()), Some(2));
        Ok(())
    }

    #[test]
    fn test_legacy_progress_is_normalized() -> Fallible<()> {
        let mut db = Database::in_memory()?;
        db.put(
            &progress_key("ket"),
            r#"[{ "id": "ket_1", "stage": "learning", "repetitions": 1, "nextReviewDate": "2025-01-01T00:00:00.000Z" }]"#,
        )?;
        let cards = db.load_progress("ket")?.unwrap();
        assert_eq!(cards[0].list_id, "ket");
        assert_eq!(cards[0].ease_factor, 2.5);
        assert_eq!(cards[0].stage, Stage::Learning);
        Ok(())
    }
}
