use std::sync::Arc;

use qbank_core::model::Theme;
use storage::repository::ProgressRepository;

use crate::error::PreferencesError;

/// Reads and writes the theme preference.
#[derive(Clone)]
pub struct PreferencesService {
    repo: Arc<dyn ProgressRepository>,
}

impl PreferencesService {
    #[must_use]
    pub fn new(repo: Arc<dyn ProgressRepository>) -> Self {
        Self { repo }
    }

    /// Load the saved theme, or the default if none was saved.
    ///
    /// # Errors
    ///
    /// Returns `PreferencesError` on storage failures.
    pub async fn load_theme(&self) -> Result<Theme, PreferencesError> {
        Ok(self.repo.load_theme().await?.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns `PreferencesError` if the theme cannot be stored.
    pub async fn save_theme(&self, theme: Theme) -> Result<Theme, PreferencesError> {
        self.repo.save_theme(theme).await?;
        Ok(theme)
    }

    /// Flip between light and dark and persist the result.
    ///
    /// # Errors
    ///
    /// Returns `PreferencesError` on storage failures.
    pub async fn toggle_theme(&self) -> Result<Theme, PreferencesError> {
        let current = self.load_theme().await?;
        self.save_theme(current.toggled()).await
    }
}
