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

use crate::collection::Collection;
use crate::error::Fallible;
use crate::queries::difficult_cards;

pub fn print_difficult_cards(directory: Option<String>, list: Option<String>) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let list = coll.open_list(list.as_deref())?;
    let difficult = difficult_cards(&list.cards);
    if difficult.is_empty() {
        println!("No difficult words right now.");
        return Ok(());
    }
    for card in difficult {
        if let Some(entry) = list.entry(&card.id) {
            println!(
                "{}\t{}\trepetitions: {} | ease: {:.1}",
                entry.english, entry.chinese, card.repetitions, card.ease_factor
            );
        }
    }
    Ok(())
}
