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

use std::collections::VecDeque;
use std::io::BufRead;
use std::io::Write;
use std::time::Instant;

use crate::collection::Collection;
use crate::collection::StudyList;
use crate::db::Database;
use crate::error::Fallible;
use crate::queries::due_cards;
use crate::queries::new_cards;
use crate::queries::studied_today;
use crate::scheduler::jitter::Jitter;
use crate::scheduler::jitter::RandomJitter;
use crate::scheduler::preview_intervals;
use crate::settings::AppSettings;
use crate::types::rating::Rating;
use crate::types::stage::Stage;
use crate::types::timestamp::Timestamp;

pub fn drill(directory: Option<String>, list: Option<String>) -> Fallible<()> {
    let mut coll = Collection::new(directory)?;
    let mut list = coll.open_list(list.as_deref())?;
    println!("Studying {}.", list.list.display_name);
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();
    let mut jitter = RandomJitter::thread_local();
    let settings = coll.settings.clone();
    let summary = run_session(
        &mut coll.db,
        &settings,
        &mut list,
        &mut input,
        &mut output,
        &mut jitter,
    )?;
    println!(
        "Studied {} cards ({} correct) in {} min.",
        summary.studied,
        summary.correct,
        (summary.seconds as f64 / 60.0).round()
    );
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
pub struct SessionSummary {
    pub studied: usize,
    /// Cards rated Good or Easy.
    pub correct: usize,
    pub seconds: u64,
}

/// The ids of the cards to study now: due reviews in list order, then new
/// cards until the daily goal is met.
pub fn session_queue(list: &StudyList, settings: &AppSettings, now: Timestamp) -> Vec<String> {
    let mut queue: Vec<String> = due_cards(&list.cards, now)
        .into_iter()
        .filter(|card| card.stage != Stage::New)
        .map(|card| card.id.clone())
        .collect();
    let remaining = (settings.daily_goal as usize).saturating_sub(studied_today(&list.cards, now));
    queue.extend(
        new_cards(&list.cards, remaining)
            .into_iter()
            .map(|card| card.id.clone()),
    );
    queue
}

/// Run an interactive session. Progress is saved after every rating, so
/// quitting at any point loses nothing.
pub fn run_session<R: BufRead, W: Write>(
    db: &mut Database,
    settings: &AppSettings,
    list: &mut StudyList,
    input: &mut R,
    output: &mut W,
    jitter: &mut dyn Jitter,
) -> Fallible<SessionSummary> {
    let started = Instant::now();
    let mut queue: VecDeque<String> = session_queue(list, settings, Timestamp::now()).into();
    let mut summary = SessionSummary {
        studied: 0,
        correct: 0,
        seconds: 0,
    };
    if queue.is_empty() {
        writeln!(output, "Nothing to study right now.")?;
    } else {
        writeln!(output, "{} cards to study.", queue.len())?;
    }
    while let Some(card_id) = queue.pop_front() {
        let (word, meaning) = match list.entry(&card_id) {
            Some(entry) => (
                format_word(&entry.english, &entry.part_of_speech),
                entry.chinese.clone(),
            ),
            None => continue,
        };
        writeln!(output)?;
        writeln!(output, "Q: {word}")?;
        writeln!(output, "[Enter to reveal, d to mark as difficult, q to quit]")?;
        match read_reveal(input)? {
            Reveal::Quit => break,
            Reveal::MarkDifficult => {
                list.mark_difficult(&card_id)?;
                list.save(db, 0, Timestamp::now())?;
                writeln!(output, "Marked as difficult.")?;
            }
            Reveal::Show => {}
        }
        writeln!(output, "A: {meaning}")?;
        let rating = match list.card(&card_id) {
            Some(card) => {
                let choices: Vec<String> = preview_intervals(card)
                    .iter()
                    .map(|(r, days)| format!("{} = {} ({}d)", r.as_number(), r.label(), days))
                    .collect();
                writeln!(output, "Grade: {}", choices.join(", "))?;
                match read_rating(input, output)? {
                    Some(rating) => rating,
                    None => break,
                }
            }
            None => continue,
        };
        let now = Timestamp::now();
        list.rate(&card_id, rating, now, jitter)?;
        list.save(db, 0, now)?;
        summary.studied += 1;
        if rating.is_correct() {
            summary.correct += 1;
        }
        if rating == Rating::Again {
            queue.push_back(card_id);
        }
        if studied_today(&list.cards, now) == settings.daily_goal as usize {
            writeln!(output, "Daily goal reached. Keep going, or press q to stop.")?;
        }
    }
    summary.seconds = started.elapsed().as_secs();
    list.save(db, summary.seconds, Timestamp::now())?;
    Ok(summary)
}

fn format_word(english: &str, part_of_speech: &str) -> String {
    if part_of_speech.is_empty() {
        english.to_string()
    } else {
        format!("{english} ({part_of_speech})")
    }
}

enum Reveal {
    Show,
    MarkDifficult,
    Quit,
}

fn read_reveal<R: BufRead>(input: &mut R) -> Fallible<Reveal> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(Reveal::Quit);
    }
    match line.trim() {
        "q" => Ok(Reveal::Quit),
        "d" => Ok(Reveal::MarkDifficult),
        _ => Ok(Reveal::Show),
    }
}

/// Read a grade, asking again until it is valid. Returns `None` to quit.
fn read_rating<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Fallible<Option<Rating>> {
    loop {
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim();
        if line == "q" {
            return Ok(None);
        }
        match line.parse::<i64>().map(Rating::try_from) {
            Ok(Ok(rating)) => return Ok(Some(rating)),
            _ => writeln!(output, "Please enter a number between 1 and 4.")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs::write;
    use std::io::Cursor;

    use tempfile::TempDir;
    use tempfile::tempdir;

    use super::*;
    use crate::scheduler::jitter::FixedJitter;

    fn vocab_dir() -> Fallible<TempDir> {
        let dir = tempdir()?;
        write(
            dir.path().join("ket.csv"),
            "english,pos,chinese\napple,n.,蘋果\nrun,v.,跑\nhappy,adj.,快樂的\n",
        )?;
        Ok(dir)
    }

    fn session(dir: &TempDir, settings: &AppSettings, keys: &str) -> Fallible<(SessionSummary, String)> {
        let mut coll = Collection::new(Some(dir.path().display().to_string()))?;
        let mut list = coll.open_list(None)?;
        let mut input = Cursor::new(keys.as_bytes().to_vec());
        let mut output: Vec<u8> = Vec::new();
        let summary = run_session(
            &mut coll.db,
            settings,
            &mut list,
            &mut input,
            &mut output,
            &mut FixedJitter::none(),
        )?;
        Ok((summary, String::from_utf8_lossy(&output).to_string()))
    }

    #[test]
    fn test_full_session() -> Fallible<()> {
        let dir = vocab_dir()?;
        let (summary, output) = session(&dir, &AppSettings::default(), "\n3\n\n4\n\n2\n")?;
        assert_eq!(summary.studied, 3);
        assert_eq!(summary.correct, 2);
        assert!(output.contains("Q: apple (n.)"));
        assert!(output.contains("A: 快樂的"));

        let coll = Collection::new(Some(dir.path().display().to_string()))?;
        let list = coll.open_list(None)?;
        assert_eq!(list.card("ket_1").map(|c| c.stage), Some(Stage::Learning));
        assert_eq!(list.card("ket_2").map(|c| c.stage), Some(Stage::Reviewing));
        assert_eq!(list.card("ket_3").map(|c| c.last_rating), Some(Some(Rating::Hard)));
        Ok(())
    }

    #[test]
    fn test_invalid_grade_is_asked_again() -> Fallible<()> {
        let dir = vocab_dir()?;
        let (summary, output) = session(&dir, &AppSettings::default(), "\n7\nx\n3\nq\n")?;
        assert_eq!(summary.studied, 1);
        assert_eq!(output.matches("Please enter a number between 1 and 4.").count(), 2);
        Ok(())
    }

    #[test]
    fn test_again_is_repeated() -> Fallible<()> {
        let dir = vocab_dir()?;
        let settings = AppSettings {
            daily_goal: 1,
            ..AppSettings::default()
        };
        let (summary, output) = session(&dir, &settings, "\n1\n\n3\n")?;
        assert_eq!(summary.studied, 2);
        assert_eq!(output.matches("Q: apple (n.)").count(), 2);
        Ok(())
    }

    #[test]
    fn test_quit_keeps_progress() -> Fallible<()> {
        let dir = vocab_dir()?;
        let (summary, _) = session(&dir, &AppSettings::default(), "\n4\nq\n")?;
        assert_eq!(summary.studied, 1);
        let coll = Collection::new(Some(dir.path().display().to_string()))?;
        let list = coll.open_list(None)?;
        assert_eq!(list.card("ket_1").map(|c| c.total_reviews), Some(1));
        assert_eq!(list.card("ket_2").map(|c| c.total_reviews), Some(0));
        Ok(())
    }

    #[test]
    fn test_mark_difficult() -> Fallible<()> {
        let dir = vocab_dir()?;
        session(&dir, &AppSettings::default(), "d\n3\nq\n")?;
        let coll = Collection::new(Some(dir.path().display().to_string()))?;
        let list = coll.open_list(None)?;
        assert_eq!(list.card("ket_1").map(|c| c.is_difficult), Some(true));
        Ok(())
    }

    #[test]
    fn test_queue_respects_daily_goal() -> Fallible<()> {
        let dir = vocab_dir()?;
        let coll = Collection::new(Some(dir.path().display().to_string()))?;
        let list = coll.open_list(None)?;
        let settings = AppSettings {
            daily_goal: 2,
            ..AppSettings::default()
        };
        assert_eq!(
            session_queue(&list, &settings, Timestamp::now()),
            vec!["ket_1", "ket_2"]
        );
        Ok(())
    }
}
