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

use serde::Deserialize;
use serde::Serialize;

/// User preferences shared by every list.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// How many new cards to introduce per day.
    pub daily_goal: u32,
    pub auto_pronounce: bool,
    pub show_examples: bool,
    pub theme: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            daily_goal: 20,
            auto_pronounce: false,
            show_examples: true,
            theme: "wabi-sabi".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    #[test]
    fn test_partial_settings_get_defaults() -> Fallible<()> {
        let settings: AppSettings = serde_json::from_str(r#"{ "dailyGoal": 35 }"#)?;
        assert_eq!(settings.daily_goal, 35);
        assert!(settings.show_examples);
        assert_eq!(settings.theme, "wabi-sabi");
        Ok(())
    }
}
