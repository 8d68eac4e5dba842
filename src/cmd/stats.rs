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

use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;
use serde::Serialize;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::queries::studied_today;
use crate::stats::Projection;
use crate::stats::Statistics;
use crate::stats::current_streak;
use crate::stats::predict_progress;
use crate::stats::statistics;
use crate::types::card::Card;
use crate::types::timestamp::Timestamp;

/// Reviews per day assumed when forecasting.
const ASSUMED_DAILY_REVIEWS: u32 = 100;

#[derive(ValueEnum, Clone)]
pub enum StatsFormat {
    /// Human-readable output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    list_id: String,
    statistics: Statistics,
    projection: Projection,
    studied_today: usize,
    daily_goal: u32,
    /// In seconds.
    total_study_time: u64,
    streak_days: u32,
}

pub fn print_list_stats(
    directory: Option<String>,
    list: Option<String>,
    format: StatsFormat,
) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let list = coll.open_list(list.as_deref())?;
    let report = build_report(&coll, &list.list.id, &list.cards, Timestamp::now())?;
    match format {
        StatsFormat::Text => print!("{}", render_text(&report)),
        StatsFormat::Json => {
            let json = serde_json::to_string_pretty(&report)?;
            println!("{json}");
        }
    }
    Ok(())
}

fn build_report(
    coll: &Collection,
    list_id: &str,
    cards: &[Card],
    now: Timestamp,
) -> Fallible<Report> {
    let daily_goal = coll.settings.daily_goal.max(1);
    let saved = coll.db.load_list_stats(list_id)?;
    let total_study_time = saved.as_ref().map_or(0, |stats| stats.total_study_time);
    let streak_days = saved.as_ref().map_or(0, |stats| current_streak(stats, now));
    Ok(Report {
        list_id: list_id.to_string(),
        statistics: statistics(cards, now),
        projection: predict_progress(cards, daily_goal, ASSUMED_DAILY_REVIEWS)?,
        studied_today: studied_today(cards, now),
        daily_goal,
        total_study_time,
        streak_days,
    })
}

fn render_text(report: &Report) -> String {
    let s = &report.statistics;
    let p = &report.projection;
    let mut out = String::new();
    out.push_str(&format!("List:              {}\n", report.list_id));
    out.push_str(&format!("Total words:       {}\n", s.total));
    out.push_str(&format!("  New:             {}\n", s.new));
    out.push_str(&format!("  Learning:        {}\n", s.learning));
    out.push_str(&format!("  Reviewing:       {}\n", s.reviewing));
    out.push_str(&format!("  Mastered:        {}\n", s.mastered));
    out.push_str(&format!("Due today:         {}\n", s.due_today));
    out.push_str(&format!(
        "Studied today:     {} / {}\n",
        report.studied_today, report.daily_goal
    ));
    out.push_str(&format!("Average ease:      {:.2}\n", s.average_ease_factor));
    out.push_str(&format!("Total reviews:     {}\n", s.total_reviews));
    out.push_str(&format!(
        "Study time:        {} min\n",
        (report.total_study_time as f64 / 60.0).round()
    ));
    out.push_str(&format!("Streak:            {} days\n", report.streak_days));
    out.push_str(&format!(
        "New words done in: {} days\n",
        p.days_to_finish_new_cards
    ));
    out.push_str(&format!(
        "Mastery in about:  {} days\n",
        p.estimated_days_to_mastery
    ));
    out.push_str(&format!(
        "Daily study time:  {} min\n",
        p.recommended_daily_study_time
    ));
    out
}
