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

use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::ErrorReport;
use crate::error::Fallible;

/// The name of the optional file describing the lists in a directory.
pub const LISTS_FILE: &str = "lists.toml";

/// A vocabulary list the learner can study.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabList {
    pub id: String,
    pub display_name: String,
    pub description: String,
    /// Path of the CSV file, relative to the vocabulary directory.
    pub csv_file: String,
    pub total_words: usize,
    /// A CEFR level such as "A2", or "Unknown".
    pub level: String,
    pub is_default: bool,
}

/// A list definition as written by the user. Only `id`, `display_name` and
/// `csv_file` are required.
#[derive(Clone, Default, Debug, Deserialize)]
pub struct ListConfig {
    pub id: Option<String>,
    #[serde(alias = "displayName")]
    pub display_name: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "csvFile")]
    pub csv_file: Option<String>,
    #[serde(alias = "totalWords")]
    pub total_words: Option<usize>,
    pub level: Option<String>,
    #[serde(alias = "isDefault")]
    pub is_default: Option<bool>,
}

#[derive(Deserialize)]
struct ListsFile {
    #[serde(default)]
    lists: Vec<ListConfig>,
}

/// The set of lists available in a vocabulary directory.
#[derive(Clone, Default, Debug)]
pub struct ListRegistry {
    lists: Vec<VocabList>,
}

impl ListRegistry {
    pub fn new() -> Self {
        Self { lists: Vec::new() }
    }

    /// Load the lists in `directory`: from `lists.toml` if present,
    /// otherwise one list per CSV file found under the directory.
    pub fn load(directory: &Path) -> Fallible<Self> {
        let config_path = directory.join(LISTS_FILE);
        if config_path.exists() {
            log::debug!("Reading list configuration from {config_path:?}");
            let content = read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            log::debug!("No {LISTS_FILE}, discovering CSV files in {directory:?}");
            Self::discover(directory)
        }
    }

    pub fn from_toml(content: &str) -> Fallible<Self> {
        let file: ListsFile = toml::from_str(content)?;
        let mut registry = Self::new();
        for config in file.lists {
            registry.add_list(config)?;
        }
        Ok(registry)
    }

    fn discover(directory: &Path) -> Fallible<Self> {
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(directory) {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") {
                paths.push(path.to_path_buf());
            }
        }
        paths.sort();
        let mut registry = Self::new();
        for (i, path) in paths.iter().enumerate() {
            let stem = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem.to_string(),
                None => continue,
            };
            if registry.exists(&stem) {
                log::warn!("Skipping {path:?}: a list named {stem:?} already exists.");
                continue;
            }
            let relative = path.strip_prefix(directory).unwrap_or(path);
            registry.add_list(ListConfig {
                id: Some(stem.clone()),
                display_name: Some(stem),
                csv_file: Some(relative.display().to_string()),
                is_default: Some(i == 0),
                ..ListConfig::default()
            })?;
        }
        Ok(registry)
    }

    /// The list marked as default, or the first list.
    pub fn default_list(&self) -> Option<&VocabList> {
        self.lists
            .iter()
            .find(|list| list.is_default)
            .or_else(|| self.lists.first())
    }

    pub fn get(&self, id: &str) -> Option<&VocabList> {
        self.lists.iter().find(|list| list.id == id)
    }

    pub fn all(&self) -> &[VocabList] {
        &self.lists
    }

    pub fn exists(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Register a new list, filling in defaults for optional fields.
    pub fn add_list(&mut self, config: ListConfig) -> Fallible<&VocabList> {
        let id = required(config.id, "id")?;
        let display_name = required(config.display_name, "display_name")?;
        let csv_file = required(config.csv_file, "csv_file")?;
        if self.exists(&id) {
            return Err(ErrorReport::validation(format!(
                "list with id {id:?} already exists."
            )));
        }
        self.lists.push(VocabList {
            id,
            display_name,
            description: config.description.unwrap_or_default(),
            csv_file,
            total_words: config.total_words.unwrap_or(0),
            level: config.level.unwrap_or_else(|| "Unknown".to_string()),
            is_default: config.is_default.unwrap_or(false),
        });
        let index = self.lists.len() - 1;
        Ok(&self.lists[index])
    }

    pub fn remove_list(&mut self, id: &str) -> Option<VocabList> {
        let index = self.lists.iter().position(|list| list.id == id)?;
        Some(self.lists.remove(index))
    }
}

fn required(value: Option<String>, field: &str) -> Fallible<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ErrorReport::validation(format!(
            "missing required field: {field}"
        ))),
    }
}
