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
use crate::vocab::csv::load_list_entries;

/// Check that every list's CSV file can be read.
pub fn check_lists(directory: Option<String>) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let mut failures = 0;
    for list in coll.registry.all() {
        match load_list_entries(&coll.directory, list) {
            Ok(entries) => println!("{}: {} words", list.id, entries.len()),
            Err(e) => {
                println!("{}: {}", list.id, e.message());
                failures += 1;
            }
        }
    }
    if failures > 0 {
        return Err(ErrorReport::validation(format!(
            "{failures} list(s) failed to load."
        )));
    }
    println!("ok");
    Ok(())
}
