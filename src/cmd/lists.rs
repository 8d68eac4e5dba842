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
use crate::queries::list_overview;

pub fn print_lists(directory: Option<String>) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let current = coll.current_list_id()?;
    for list in coll.registry.all() {
        let cards = coll.db.load_progress(&list.id)?.unwrap_or_default();
        let overview = list_overview(list, &cards);
        let marker = if list.id == current { "*" } else { " " };
        let saved = match coll.db.progress_updated_at(&list.id)? {
            Some(ts) => format!(", last saved {}", ts.local_date()),
            None => String::new(),
        };
        println!(
            "{marker} {} ({}): {} learned, {} mastered of {} words{saved}",
            overview.list_id,
            overview.display_name,
            overview.words_learned,
            overview.words_mastered,
            overview.total_words
        );
    }
    Ok(())
}
