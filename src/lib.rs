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

//! vocabcards: a vocabulary flashcard trainer.
//!
//! The core is the spaced-repetition [`scheduler`], a pure function from a
//! card's state and a rating to the card's next state, together with the
//! read-only [`queries`] and [`stats`] over collections of cards. The other
//! modules load vocabulary lists, persist progress, and drive study
//! sessions from the command line.

pub mod cli;
pub mod cmd;
pub mod collection;
pub mod db;
pub mod error;
pub mod exchange;
pub mod queries;
pub mod scheduler;
pub mod settings;
pub mod stats;
pub mod types;
pub mod vocab;

pub use error::ErrorKind;
pub use error::ErrorReport;
pub use error::Fallible;
pub use error::fail;
pub use scheduler::apply_rating;
pub use types::card::Card;
pub use types::rating::Rating;
pub use types::stage::Stage;
pub use types::timestamp::Timestamp;
