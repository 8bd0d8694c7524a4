//! Create / update / delete handlers behind the editing forms.
//!
//! A handler never fails: every outcome, good or bad, comes back as a
//! [`FormOutcome`] carrying a notice, a message and the route to show next.

mod create;
mod delete;
mod update;

pub use create::{create_character, create_weapon, CharacterSubmission, WeaponSubmission};
pub use delete::{delete_character, delete_weapon};
pub use update::{update_character_image, update_character_intro};

use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use crate::error::CodexError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Notice {
    Success,
    Error,
}

/// Page a form returns to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    CreateCharacter,
    CreateWeapon,
    UpdateCharacterImage,
    UpdateCharacterIntro,
    DeleteCharacter,
    DeleteWeapon,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::CreateCharacter => "/create/character/",
            Route::CreateWeapon => "/create/weapon/",
            Route::UpdateCharacterImage => "/update/character/image/",
            Route::UpdateCharacterIntro => "/update/character/introduction/",
            Route::DeleteCharacter => "/delete/character/",
            Route::DeleteWeapon => "/delete/weapon/",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormOutcome {
    pub notice: Notice,
    pub message: String,
    pub redirect: Route,
}

impl FormOutcome {
    pub fn success(redirect: Route, message: impl Into<String>) -> Self {
        let message = message.into();
        info!(route = redirect.path(), "{}", message);
        Self {
            notice: Notice::Success,
            message,
            redirect,
        }
    }

    pub fn error(redirect: Route, message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(route = redirect.path(), "{}", message);
        Self {
            notice: Notice::Error,
            message,
            redirect,
        }
    }

    /// Turn a failed unit of work into an error notice
    pub fn failed(redirect: Route, err: &CodexError) -> Self {
        let message = match err {
            CodexError::Validation(msg) => format!("validation failed: {}", msg),
            other => format!("save failed: {}", other),
        };
        Self::error(redirect, message)
    }

    pub fn is_success(&self) -> bool {
        self.notice == Notice::Success
    }
}

impl fmt::Display for FormOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.notice {
            Notice::Success => "ok",
            Notice::Error => "error",
        };
        write!(f, "[{}] {} -> {}", tag, self.message, self.redirect.path())
    }
}

/// Require every `(field, value)` to be non-blank
fn require(fields: &[(&str, &str)]) -> Result<(), CodexError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| *field)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CodexError::validation(format!(
            "required fields are blank: {}",
            missing.join(", ")
        )))
    }
}
