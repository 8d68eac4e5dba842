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

pub fn reset_progress(directory: Option<String>, list: Option<String>, all: bool) -> Fallible<()> {
    let mut coll = Collection::new(directory)?;
    if all {
        coll.db.reset_all()?;
        println!("All progress has been reset.");
        return Ok(());
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
    coll.db.clear_progress(&list_id)?;
    println!("Progress for {list_id} has been reset.");
    Ok(())
}
