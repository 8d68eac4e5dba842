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

use std::collections::HashMap;
use std::env::current_dir;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use crate::db::Database;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::scheduler::apply_rating;
use crate::scheduler::jitter::Jitter;
use crate::settings::AppSettings;
use crate::stats::ListStats;
use crate::stats::next_streak;
use crate::stats::statistics;
use crate::types::card::Card;
use crate::types::entry::VocabEntry;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;
use crate::vocab::csv::initial_cards;
use crate::vocab::csv::load_list_entries;
use crate::vocab::lists::ListRegistry;
use crate::vocab::lists::VocabList;

/// The name of the database file inside a vocabulary directory.
pub const DATABASE_FILE: &str = "vocabcards.db";

/// A vocabulary directory: its lists, its progress database, and the
/// learner's settings.
pub struct Collection {
    pub directory: PathBuf,
    pub db: Database,
    pub registry: ListRegistry,
    pub settings: AppSettings,
}

impl Collection {
    pub fn new(directory: Option<String>) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(dir) => PathBuf::from(dir),
            None => current_dir()?,
        };
        let directory = if directory.exists() {
            directory.canonicalize()?
        } else {
            return fail("directory does not exist.");
        };

        let db_path: PathBuf = directory.join(DATABASE_FILE);
        let db_path: &str = db_path
            .to_str()
            .ok_or_else(|| ErrorReport::new("invalid path"))?;
        let db: Database = Database::new(db_path)?;
        let registry = ListRegistry::load(&directory)?;
        if registry.all().is_empty() {
            return fail("no vocabulary lists found.");
        }
        let settings = db.load_settings()?;

        Ok(Self {
            directory,
            db,
            registry,
            settings,
        })
    }

    /// The list the learner last selected, or the default list.
    pub fn current_list_id(&self) -> Fallible<String> {
        if let Some(id) = self.db.load_current_list()? {
            if self.registry.exists(&id) {
                return Ok(id);
            }
            log::warn!("Current list {id:?} no longer exists, using the default list.");
        }
        match self.registry.default_list() {
            Some(list) => Ok(list.id.clone()),
            None => fail("no vocabulary lists found."),
        }
    }

    /// Load a list by id, or the current list if `list_id` is `None`.
    pub fn open_list(&self, list_id: Option<&str>) -> Fallible<StudyList> {
        let list_id = match list_id {
            Some(id) => id.to_string(),
            None => self.current_list_id()?,
        };
        let list = self
            .registry
            .get(&list_id)
            .ok_or_else(|| ErrorReport::validation(format!("list {list_id:?} does not exist.")))?;
        StudyList::load(&self.directory, list, &self.db)
    }
}

/// One vocabulary list, with the learning state of each of its words.
pub struct StudyList {
    pub list: VocabList,
    /// In file order. `cards[i]` tracks `entries[i]`.
    pub entries: Vec<VocabEntry>,
    pub cards: Vec<Card>,
}

impl StudyList {
    /// Read the list's words and merge in any saved progress.
    pub fn load(directory: &Path, list: &VocabList, db: &Database) -> Fallible<Self> {
        log::debug!("Loading list {:?}...", list.id);
        let start = Instant::now();
        let entries = load_list_entries(directory, list)?;
        let saved = db.load_progress(&list.id)?.unwrap_or_default();
        let study_list = Self::from_parts(list.clone(), entries, saved);
        let duration = start.elapsed().as_millis();
        log::debug!("List loaded in {duration}ms.");
        Ok(study_list)
    }

    /// Pair entries with fresh cards, then overlay saved state by id.
    /// Saved cards whose entry is gone are dropped.
    pub fn from_parts(list: VocabList, entries: Vec<VocabEntry>, saved: Vec<Card>) -> Self {
        let mut cards = initial_cards(&entries);
        let mut saved: HashMap<String, Card> =
            saved.into_iter().map(|card| (card.id.clone(), card)).collect();
        for card in cards.iter_mut() {
            if let Some(saved_card) = saved.remove(&card.id) {
                *card = saved_card;
            }
        }
        if !saved.is_empty() {
            log::debug!(
                "Dropping saved progress for {} cards no longer in list {:?}",
                saved.len(),
                list.id
            );
        }
        Self {
            list,
            entries,
            cards,
        }
    }

    fn position(&self, card_id: &str) -> Fallible<usize> {
        self.cards
            .iter()
            .position(|card| card.id == card_id)
            .ok_or_else(|| ErrorReport::new(format!("no card with id {card_id:?}.")))
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == card_id)
    }

    pub fn entry(&self, card_id: &str) -> Option<&VocabEntry> {
        self.entries.iter().find(|entry| entry.id == card_id)
    }

    /// Apply a rating to a card and keep the result.
    pub fn rate(
        &mut self,
        card_id: &str,
        rating: Rating,
        now: Timestamp,
        jitter: &mut dyn Jitter,
    ) -> Fallible<&Card> {
        let index = self.position(card_id)?;
        let next = apply_rating(&self.cards[index], rating, now, jitter);
        log::debug!(
            "Rated {card_id} {rating}: stage={}, interval={}d",
            next.stage,
            next.interval
        );
        self.cards[index] = next;
        Ok(&self.cards[index])
    }

    pub fn mark_difficult(&mut self, card_id: &str) -> Fallible<()> {
        let index = self.position(card_id)?;
        self.cards[index].is_difficult = true;
        Ok(())
    }

    /// Persist the cards, and refresh the list's saved statistics, adding
    /// `study_seconds` to the accumulated study time.
    pub fn save(&self, db: &mut Database, study_seconds: u64, now: Timestamp) -> Fallible<()> {
        db.save_progress(&self.list.id, &self.cards)?;
        let previous = db.load_list_stats(&self.list.id)?;
        let total_study_time = previous.as_ref().map_or(0, |stats| stats.total_study_time);
        let stats = ListStats {
            statistics: statistics(&self.cards, now),
            total_study_time: total_study_time + study_seconds,
            last_study_date: Some(now),
            streak_days: next_streak(previous.as_ref(), now),
        };
        db.save_list_stats(&self.list.id, &stats)
    }

    /// Forget all progress in this list, in memory and in the store.
    pub fn clear_progress(&mut self, db: &mut Database) -> Fallible<()> {
        for card in self.cards.iter_mut() {
            card.reset();
        }
        db.clear_progress(&self.list.id)
    }
}
