use std::num::NonZeroUsize;
use std::time::Duration;

use qbank_core::pagination::DEFAULT_PAGE_SIZE;

use crate::error::ConfigError;

/// Idle time after the last keystroke before a search runs.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Tunables for `QuestionBrowser`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowserConfig {
    pub page_size: NonZeroUsize,
    pub search_debounce: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }
}

impl BrowserConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::ZeroPageSize` if `page_size` is zero.
    pub fn new(page_size: usize, search_debounce: Duration) -> Result<Self, ConfigError> {
        let page_size = NonZeroUsize::new(page_size).ok_or(ConfigError::ZeroPageSize)?;
        Ok(Self {
            page_size,
            search_debounce,
        })
    }
}
