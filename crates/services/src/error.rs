//! Shared error types for the services crate.

use thiserror::Error;

use qbank_core::model::{ProgressKind, ValidationError};
use storage::repository::StorageError;

/// A progress set could not be written. The in-memory change is kept.
#[derive(Debug, Error)]
#[error("failed to persist {kind}")]
pub struct PersistenceError {
    pub kind: ProgressKind,
    #[source]
    pub cause: StorageError,
}

/// Errors emitted by `BrowserConfig`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("page size must be at least 1")]
    ZeroPageSize,
}

/// Errors emitted by `QuestionBrowser`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BrowserError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Errors emitted while rendering an export.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("export is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Errors emitted by `PreferencesService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PreferencesError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
