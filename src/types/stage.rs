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

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

use crate::error::ErrorReport;

/// Where a card is in its retention lifecycle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Stage {
    /// Never reviewed.
    #[default]
    New,
    Learning,
    Reviewing,
    Mastered,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::New, Stage::Learning, Stage::Reviewing, Stage::Mastered];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::New => "new",
            Stage::Learning => "learning",
            Stage::Reviewing => "reviewing",
            Stage::Mastered => "mastered",
        }
    }
}

impl TryFrom<&str> for Stage {
    type Error = ErrorReport;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(Stage::New),
            "learning" => Ok(Stage::Learning),
            "reviewing" => Ok(Stage::Reviewing),
            "mastered" => Ok(Stage::Mastered),
            _ => Err(ErrorReport::validation(format!("invalid stage: {value:?}"))),
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Stage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Stage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let string = String::deserialize(deserializer)?;
        Stage::try_from(string.as_str())
            .map_err(|e| serde::de::Error::custom(e.message().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    #[test]
    fn test_parse() -> Fallible<()> {
        for stage in Stage::ALL {
            assert_eq!(Stage::try_from(stage.as_str())?, stage);
        }
        assert_eq!(Stage::try_from("MASTERED")?, Stage::Mastered);
        assert!(Stage::try_from("forgotten").is_err());
        Ok(())
    }
}
