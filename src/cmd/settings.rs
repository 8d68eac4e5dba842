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
use crate::error::ErrorReport;
use crate::error::Fallible;

pub fn update_settings(
    directory: Option<String>,
    daily_goal: Option<u32>,
    current_list: Option<String>,
) -> Fallible<()> {
    let mut coll = Collection::new(directory)?;
    if let Some(goal) = daily_goal {
        if goal == 0 {
            return Err(ErrorReport::validation("daily goal must be positive."));
        }
        coll.settings.daily_goal = goal;
        coll.db.save_settings(&coll.settings)?;
    }
    if let Some(id) = current_list {
        if !coll.registry.exists(&id) {
            return Err(ErrorReport::validation(format!(
                "list {id:?} does not exist."
            )));
        }
        coll.db.save_current_list(&id)?;
    }
    let json = serde_json::to_string_pretty(&coll.settings)?;
    println!("{json}");
    println!("Current list: {}", coll.current_list_id()?);
    Ok(())
}
