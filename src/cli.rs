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

use clap::Parser;

use crate::cmd::check::check_lists;
use crate::cmd::difficult::print_difficult_cards;
use crate::cmd::drill::drill;
use crate::cmd::export::export_list;
use crate::cmd::import::import_file;
use crate::cmd::lists::print_lists;
use crate::cmd::reset::reset_progress;
use crate::cmd::settings::update_settings;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_list_stats;
use crate::error::Fallible;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Drill due cards, then new cards up to the daily goal.
    Drill {
        /// Path to the vocabulary directory. Defaults to the current directory.
        directory: Option<String>,
        /// The list to study. Defaults to the current list.
        #[arg(long)]
        list: Option<String>,
    },
    /// Show the available lists and how far along each one is.
    Lists {
        /// Path to the vocabulary directory.
        directory: Option<String>,
    },
    /// Print statistics and a progress forecast for a list.
    Stats {
        /// Path to the vocabulary directory.
        directory: Option<String>,
        #[arg(long)]
        list: Option<String>,
        /// Output format.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// List the cards the learner struggles with, hardest first.
    Difficult {
        /// Path to the vocabulary directory.
        directory: Option<String>,
        #[arg(long)]
        list: Option<String>,
    },
    /// Export a list's progress as JSON to standard output.
    Export {
        /// Path to the vocabulary directory.
        directory: Option<String>,
        #[arg(long)]
        list: Option<String>,
    },
    /// Import progress from a JSON file.
    Import {
        /// The file to import.
        file: String,
        /// Path to the vocabulary directory.
        directory: Option<String>,
        /// The list to import plain card exports into.
        #[arg(long)]
        list: Option<String>,
    },
    /// Clear learning progress.
    Reset {
        /// Path to the vocabulary directory.
        directory: Option<String>,
        /// The list to reset. Defaults to the current list.
        #[arg(long, conflicts_with = "all")]
        list: Option<String>,
        /// Reset every list, the settings, and the current list.
        #[arg(long)]
        all: bool,
    },
    /// Show or change settings.
    Settings {
        /// Path to the vocabulary directory.
        directory: Option<String>,
        /// How many new cards to study per day.
        #[arg(long)]
        daily_goal: Option<u32>,
        /// The list to study by default.
        #[arg(long)]
        current_list: Option<String>,
    },
    /// Check that every list's CSV file is well-formed.
    Check {
        /// Path to the vocabulary directory.
        directory: Option<String>,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Drill { directory, list } => drill(directory, list),
        Command::Lists { directory } => print_lists(directory),
        Command::Stats {
            directory,
            list,
            format,
        } => print_list_stats(directory, list, format),
        Command::Difficult { directory, list } => print_difficult_cards(directory, list),
        Command::Export { directory, list } => export_list(directory, list),
        Command::Import {
            file,
            directory,
            list,
        } => import_file(&file, directory, list),
        Command::Reset {
            directory,
            list,
            all,
        } => reset_progress(directory, list, all),
        Command::Settings {
            directory,
            daily_goal,
            current_list,
        } => update_settings(directory, daily_goal, current_list),
        Command::Check { directory } => check_lists(directory),
    }
}
