use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Parse one element of a fixture array into its typed record
pub fn parse_record<T: DeserializeOwned>(value: Value) -> serde_json::Result<T> {
    serde_json::from_value(value)
}

/// `calamity.json`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CalamityRecord {
    pub title: String,
    pub summary: String,
}

/// `place.json`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaceRecord {
    #[serde(rename = "地名")]
    pub name: String,
    #[serde(rename = "所属大洲", default)]
    pub continent: String,
    #[serde(rename = "介绍", default)]
    pub description: String,
}

/// `chapter.json`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChapterRecord {
    pub chapter: i64,
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub locations: Vec<String>,
}

/// `character.json`. Every field is optional here; defaults are applied by
/// the reconciler.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CharacterRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub race: Option<String>,
    #[serde(default)]
    pub ability: Option<String>,
    #[serde(default)]
    pub introduction: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    /// counterpart name -> relationship type; edges point counterpart -> self
    #[serde(default)]
    pub superiors: BTreeMap<String, String>,
    /// counterpart name -> relationship type; edges point self -> counterpart
    #[serde(default)]
    pub subordinates: BTreeMap<String, String>,
}

impl CharacterRecord {
    /// Trimmed name, or `None` when blank
    pub fn trimmed_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// `weapon.json`. Also the shape written by the weapon export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaponRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub introduction: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}
