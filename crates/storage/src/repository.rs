use async_trait::async_trait;
use qbank_core::model::{ProgressKind, QuestionId, Theme};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Keys of the persisted user state. Each is written independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Bookmarks,
    Studied,
    Theme,
}

impl StoreKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::Bookmarks => "qbank_bookmarks",
            StoreKey::Studied => "qbank_studied",
            StoreKey::Theme => "qbank_theme",
        }
    }
}

impl From<ProgressKind> for StoreKey {
    fn from(kind: ProgressKind) -> Self {
        match kind {
            ProgressKind::Bookmark => StoreKey::Bookmarks,
            ProgressKind::Studied => StoreKey::Studied,
        }
    }
}

/// Encode an id set as a JSON array of strings, sorted for stable output.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_id_set(ids: &HashSet<QuestionId>) -> Result<String, StorageError> {
    let mut sorted: Vec<&str> = ids.iter().map(QuestionId::as_str).collect();
    sorted.sort_unstable();
    serde_json::to_string(&sorted).map_err(|err| StorageError::Serialization(err.to_string()))
}

/// Decode a JSON array of strings into an id set.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the value is not an array of strings.
pub fn decode_id_set(raw: &str) -> Result<HashSet<QuestionId>, StorageError> {
    let ids: Vec<String> =
        serde_json::from_str(raw).map_err(|err| StorageError::Serialization(err.to_string()))?;
    Ok(ids.into_iter().map(QuestionId::from).collect())
}

/// Repository contract for persisted user progress and preferences.
///
/// Writes are full replacements of a key's value; last write wins.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Load one id set. A key that was never written yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or the stored value is malformed.
    async fn load_ids(&self, kind: ProgressKind) -> Result<HashSet<QuestionId>, StorageError>;

    /// Replace one id set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the set cannot be stored.
    async fn save_ids(
        &self,
        kind: ProgressKind,
        ids: &HashSet<QuestionId>,
    ) -> Result<(), StorageError>;

    /// Load the theme preference, if one was saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or the stored value is unknown.
    async fn load_theme(&self) -> Result<Option<Theme>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the preference cannot be stored.
    async fn save_theme(&self, theme: Theme) -> Result<(), StorageError>;
}

pub(crate) fn parse_theme(raw: &str) -> Result<Theme, StorageError> {
    raw.parse::<Theme>()
        .map_err(|err| StorageError::Serialization(err.to_string()))
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Values are stored in their encoded form so round-trips exercise the same
/// codec as the SQLite backend.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    values: Arc<Mutex<HashMap<StoreKey, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, to simulate exhausted or disabled storage.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw stored value for a key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn raw(&self, key: StoreKey) -> Result<Option<String>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&key).cloned())
    }

    fn put(&self, key: StoreKey, value: String) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("storage quota exceeded".into()));
        }
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key, value);
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_ids(&self, kind: ProgressKind) -> Result<HashSet<QuestionId>, StorageError> {
        match self.raw(kind.into())? {
            Some(raw) => decode_id_set(&raw),
            None => Ok(HashSet::new()),
        }
    }

    async fn save_ids(
        &self,
        kind: ProgressKind,
        ids: &HashSet<QuestionId>,
    ) -> Result<(), StorageError> {
        let encoded = encode_id_set(ids)?;
        self.put(kind.into(), encoded)
    }

    async fn load_theme(&self) -> Result<Option<Theme>, StorageError> {
        self.raw(StoreKey::Theme)?
            .map(|raw| parse_theme(&raw))
            .transpose()
    }

    async fn save_theme(&self, theme: Theme) -> Result<(), StorageError> {
        self.put(StoreKey::Theme, theme.as_str().to_owned())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let progress: Arc<dyn ProgressRepository> = Arc::new(InMemoryRepository::new());
        Self { progress }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> HashSet<QuestionId> {
        raw.iter().copied().map(QuestionId::from).collect()
    }

    #[tokio::test]
    async fn round_trips_id_sets_independently() {
        let repo = InMemoryRepository::new();
        repo.save_ids(ProgressKind::Bookmark, &ids(&["q3", "q1"]))
            .await
            .unwrap();
        repo.save_ids(ProgressKind::Studied, &ids(&["q2"]))
            .await
            .unwrap();

        assert_eq!(
            repo.load_ids(ProgressKind::Bookmark).await.unwrap(),
            ids(&["q1", "q3"])
        );
        assert_eq!(
            repo.load_ids(ProgressKind::Studied).await.unwrap(),
            ids(&["q2"])
        );
        assert_eq!(
            repo.raw(StoreKey::Bookmarks).unwrap().as_deref(),
            Some(r#"["q1","q3"]"#)
        );
    }

    #[tokio::test]
    async fn missing_key_loads_as_empty_set() {
        let repo = InMemoryRepository::new();
        assert!(repo.load_ids(ProgressKind::Studied).await.unwrap().is_empty());
        assert_eq!(repo.load_theme().await.unwrap(), None);
    }

    #[tokio::test]
    async fn failed_writes_keep_previous_value() {
        let repo = InMemoryRepository::new();
        repo.save_ids(ProgressKind::Bookmark, &ids(&["q1"]))
            .await
            .unwrap();
        repo.set_fail_writes(true);

        let err = repo
            .save_ids(ProgressKind::Bookmark, &ids(&["q1", "q2"]))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Connection(_)));
        assert_eq!(
            repo.load_ids(ProgressKind::Bookmark).await.unwrap(),
            ids(&["q1"])
        );
    }

    #[test]
    fn decode_rejects_non_string_arrays() {
        assert!(decode_id_set("[1,2]").is_err());
        assert!(decode_id_set("{}").is_err());
        assert_eq!(decode_id_set("[]").unwrap(), HashSet::new());
    }

    #[tokio::test]
    async fn theme_round_trips() {
        let repo = InMemoryRepository::new();
        repo.save_theme(Theme::Dark).await.unwrap();
        assert_eq!(repo.load_theme().await.unwrap(), Some(Theme::Dark));
    }
}
