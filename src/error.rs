//! Error taxonomy for the library.
//!
//! Form handlers translate every variant into a user-facing message; the
//! seeder turns fixture variants into a failed step report and keeps going.

use std::path::PathBuf;

use rusqlite::ErrorCode;
use thiserror::Error;

pub type Result<T, E = CodexError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum CodexError {
    /// A lookup by name, id or chapter number matched nothing.
    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    /// A submission is missing a required field or carries bad content.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("fixture file not found: {}", path.display())]
    FixtureMissing { path: PathBuf },

    #[error("failed to read fixture {}: {source}", path.display())]
    FixtureRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {}: {source}", path.display())]
    FixtureMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("fixture {} is not a JSON array", path.display())]
    FixtureNotArray { path: PathBuf },

    /// The store rejected a write (duplicate unique value, dangling foreign
    /// key, failed CHECK).
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("database error: {0}")]
    Database(rusqlite::Error),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodexError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        CodexError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CodexError::Validation(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CodexError::NotFound { .. })
    }

    /// True for file-level fixture problems, which abort one step only
    pub fn is_fixture(&self) -> bool {
        matches!(
            self,
            CodexError::FixtureMissing { .. }
                | CodexError::FixtureRead { .. }
                | CodexError::FixtureMalformed { .. }
                | CodexError::FixtureNotArray { .. }
        )
    }
}

impl From<rusqlite::Error> for CodexError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &err {
            if failure.code == ErrorCode::ConstraintViolation {
                let detail = message.clone().unwrap_or_else(|| failure.to_string());
                return CodexError::Constraint(detail);
            }
        }
        if matches!(err, rusqlite::Error::QueryReturnedNoRows) {
            return CodexError::not_found("row", "query");
        }
        CodexError::Database(err)
    }
}
