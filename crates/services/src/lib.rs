#![forbid(unsafe_code)]

pub mod browser;
pub mod catalog_loader;
pub mod config;
pub mod debounce;
pub mod error;
pub mod events;
pub mod export;
pub mod preferences;
pub mod progress_tracker;

pub use qbank_core::Clock;

pub use browser::{FilteredPage, QuestionBrowser, Startup};
pub use catalog_loader::{LoadedCatalog, load_catalog};
pub use config::BrowserConfig;
pub use error::{BrowserError, ConfigError, ExportError, PersistenceError, PreferencesError};
pub use events::BrowserEvent;
pub use export::ExportFormat;
pub use preferences::PreferencesService;
pub use progress_tracker::{ProgressTracker, ToggleOutcome};
