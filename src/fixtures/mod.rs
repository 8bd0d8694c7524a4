pub mod record;

pub use record::*;

use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{CodexError, Result};

pub const CALAMITY_FILE: &str = "calamity.json";
pub const PLACE_FILE: &str = "place.json";
pub const CHAPTER_FILE: &str = "chapter.json";
pub const CHARACTER_FILE: &str = "character.json";
pub const WEAPON_FILE: &str = "weapon.json";

/// A directory of JSON fixture files
#[derive(Debug, Clone)]
pub struct FixtureDir {
    root: PathBuf,
}

impl FixtureDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    /// Read a fixture file whose top level must be an array. Elements are
    /// returned untyped so a bad record can be rejected on its own.
    pub fn read_array(&self, file: &str) -> Result<Vec<Value>> {
        let path = self.path_of(file);

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(CodexError::FixtureMissing { path });
            }
            Err(source) => return Err(CodexError::FixtureRead { path, source }),
        };

        let value: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(source) => return Err(CodexError::FixtureMalformed { path, source }),
        };

        match value {
            Value::Array(items) => Ok(items),
            _ => Err(CodexError::FixtureNotArray { path }),
        }
    }
}
