//! Row types shared by the store, the seeder and the form handlers.

use std::fmt;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CodexError;

/// Organization recorded when none is given
pub const DEFAULT_ORGANIZATION: &str = "无组织";

/// Location description recorded when none is given
pub const PLACEHOLDER_DESCRIPTION: &str = "暂无";

/// Name of the sentinel continent used when a location's continent is unknown
pub const SENTINEL_CONTINENT: &str = "无";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Race {
    #[serde(rename = "人")]
    Human,
    #[serde(rename = "妖")]
    Demon,
    #[serde(rename = "仙")]
    Immortal,
}

impl Race {
    pub fn as_str(self) -> &'static str {
        match self {
            Race::Human => "人",
            Race::Demon => "妖",
            Race::Immortal => "仙",
        }
    }
}

impl Default for Race {
    fn default() -> Self {
        Race::Immortal
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Race {
    type Err = CodexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "人" | "human" | "Human" => Ok(Race::Human),
            "妖" | "demon" | "Demon" => Ok(Race::Demon),
            "仙" | "immortal" | "Immortal" => Ok(Race::Immortal),
            other => Err(CodexError::validation(format!(
                "unknown race '{}' (expected 人, 妖 or 仙)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewCharacter {
    pub name: String,
    pub image: Option<String>,
    pub race: Race,
    pub ability: String,
    pub intro: String,
    pub organization: String,
}

#[derive(Debug, Clone)]
pub struct NewWeapon {
    pub name: String,
    pub image: Option<String>,
    pub description: String,
    pub owner_character_id: Option<i64>,
}

/// Current time in the format stored in `created_at` columns
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Six-digit zero-padded display form of a row id
pub fn formatted_id(id: i64) -> String {
    format!("{:06}", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_race_parses_both_spellings() {
        assert_eq!("妖".parse::<Race>().unwrap(), Race::Demon);
        assert_eq!(" human ".parse::<Race>().unwrap(), Race::Human);
        assert!("dragon".parse::<Race>().is_err());
    }

    #[test]
    fn test_race_defaults_to_immortal() {
        assert_eq!(Race::default(), Race::Immortal);
        assert_eq!(Race::default().to_string(), "仙");
    }

    #[test]
    fn test_formatted_id() {
        assert_eq!(formatted_id(1), "000001");
        assert_eq!(formatted_id(123456), "123456");
    }
}
