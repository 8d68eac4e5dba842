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

use std::fs::read_to_string;

use serde_json::Value;

use crate::collection::Collection;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::exchange::import_data;
use crate::exchange::import_list_progress;

/// Import a file written by `export`, or a plain card export into the
/// given (or current) list.
pub fn import_file(file: &str, directory: Option<String>, list: Option<String>) -> Fallible<()> {
    let mut coll = Collection::new(directory)?;
    let text = read_to_string(file)?;
    let payload: Value = serde_json::from_str(&text)
        .map_err(|e| ErrorReport::validation(format!("import file is not valid JSON: {e}")))?;
    let (list_id, count) = import_payload(&mut coll, &payload, list)?;
    println!("Imported {count} cards into {list_id}.");
    Ok(())
}

fn import_payload(
    coll: &mut Collection,
    payload: &Value,
    list: Option<String>,
) -> Fallible<(String, usize)> {
    if payload.get("listId").is_some() {
        let list_id = import_list_progress(&mut coll.db, &coll.registry, payload)?;
        let count = coll.db.load_progress(&list_id)?.map(|c| c.len()).unwrap_or(0);
        return Ok((list_id, count));
    }
    let list_id = match list {
        Some(id) => id,
        None => coll.current_list_id()?,
    };
    if !coll.registry.exists(&list_id) {
        return Err(ErrorReport::validation(format!(
            "list {list_id:?} does not exist."
        )));
    }
    let mut cards = import_data(payload)?;
    for card in cards.iter_mut() {
        if card.list_id.is_empty() {
            card.list_id = list_id.clone();
        }
    }
    coll.db.save_progress(&list_id, &cards)?;
    Ok((list_id, cards.len()))
}
