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

//! Reading vocabulary lists from CSV files.
//!
//! A list file has a header row followed by one row per word with three
//! columns: the English word, its part of speech, and its Chinese meaning.

use std::fs::read_to_string;
use std::path::Path;

use csv::ReaderBuilder;
use csv::StringRecord;
use csv::Trim;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::card::Card;
use crate::types::entry::VocabEntry;
use crate::vocab::lists::VocabList;

/// Header rows we recognize even when they don't have exactly three columns.
const KNOWN_HEADERS: [&str; 3] = ["英文詞彙,詞性,中文解釋", "english,pos,chinese", "word,type,meaning"];

/// Check that `content` looks like a vocabulary list.
pub fn validate_csv_format(content: &str) -> Fallible<()> {
    let mut lines = content.lines();
    let header = lines.next().map(str::trim).unwrap_or_default();
    if header.is_empty() || lines.next().is_none() {
        return Err(ErrorReport::validation(
            "CSV file must have at least a header and one data row.",
        ));
    }
    let lowercase = header.to_lowercase();
    let known = KNOWN_HEADERS.iter().any(|known| lowercase.contains(known));
    if !known && header.split(',').count() != 3 {
        return Err(ErrorReport::validation(
            "CSV header should contain three columns: English word, part of speech, Chinese meaning.",
        ));
    }
    Ok(())
}

/// Parse the rows of a list file into entries.
///
/// Rows without an English word or a Chinese meaning are skipped. Each
/// entry's id is `<list id>_<row>`, where the row is the physical line
/// number counted from the header (row 0). Blank lines are counted too, so
/// ids stay stable when the file is reloaded.
pub fn parse_vocab_csv(content: &str, list_id: &str) -> Fallible<Vec<VocabEntry>> {
    let mut entries = Vec::new();
    for (row, line) in content.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let Some(record) = parse_row(line)? else {
            continue;
        };
        let english = record.get(0).unwrap_or_default();
        let part_of_speech = record.get(1).unwrap_or_default();
        let chinese = record.get(2).unwrap_or_default();
        if english.is_empty() || chinese.is_empty() {
            continue;
        }
        entries.push(VocabEntry {
            id: format!("{list_id}_{row}"),
            list_id: list_id.to_string(),
            english: english.to_string(),
            part_of_speech: part_of_speech.to_string(),
            chinese: chinese.to_string(),
        });
    }
    Ok(entries)
}

fn parse_row(line: &str) -> Fallible<Option<StringRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(line.as_bytes());
    let record = reader.records().next().transpose()?;
    Ok(record)
}

/// Read and parse a list's CSV file from the vocabulary directory.
pub fn load_list_entries(directory: &Path, list: &VocabList) -> Fallible<Vec<VocabEntry>> {
    let path = directory.join(&list.csv_file);
    if !path.exists() {
        return Err(ErrorReport::validation(format!(
            "CSV file for list {:?} does not exist: {path:?}",
            list.id
        )));
    }
    let content = read_to_string(&path)?;
    validate_csv_format(&content)?;
    let entries = parse_vocab_csv(&content, &list.id)?;
    log::debug!("Read {} entries from {path:?}", entries.len());
    Ok(entries)
}

/// Fresh scheduling state for each entry.
pub fn initial_cards(entries: &[VocabEntry]) -> Vec<Card> {
    entries
        .iter()
        .map(|entry| Card::new(entry.id.clone(), entry.list_id.clone()))
        .collect()
}
