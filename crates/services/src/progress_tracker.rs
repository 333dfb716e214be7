use std::collections::HashSet;
use std::sync::Arc;

use qbank_core::Catalog;
use qbank_core::model::{ProgressKind, ProgressSets, ProgressSummary, QuestionId};
use storage::repository::ProgressRepository;
use tracing::{debug, warn};

use crate::error::PersistenceError;

/// Outcome of a toggle: the new membership and whether it reached storage.
#[derive(Debug)]
pub struct ToggleOutcome {
    pub is_member: bool,
    pub persisted: Result<(), PersistenceError>,
}

/// Owns the bookmark and studied sets and writes each change through to the
/// repository as a full-set replacement.
///
/// A failed write is reported but never rolls back the in-memory change.
#[derive(Clone)]
pub struct ProgressTracker {
    sets: ProgressSets,
    repo: Arc<dyn ProgressRepository>,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(repo: Arc<dyn ProgressRepository>) -> Self {
        Self {
            sets: ProgressSets::default(),
            repo,
        }
    }

    /// Load both sets from the repository. A set that cannot be read starts empty.
    pub async fn hydrate(repo: Arc<dyn ProgressRepository>) -> Self {
        let bookmarks = load_or_empty(repo.as_ref(), ProgressKind::Bookmark).await;
        let studied = load_or_empty(repo.as_ref(), ProgressKind::Studied).await;
        debug!(
            bookmarks = bookmarks.len(),
            studied = studied.len(),
            "hydrated progress"
        );
        Self {
            sets: ProgressSets::new(bookmarks, studied),
            repo,
        }
    }

    #[must_use]
    pub fn sets(&self) -> &ProgressSets {
        &self.sets
    }

    #[must_use]
    pub fn is_bookmarked(&self, id: &str) -> bool {
        self.sets.is_bookmarked(id)
    }

    #[must_use]
    pub fn is_studied(&self, id: &str) -> bool {
        self.sets.is_studied(id)
    }

    /// Flip membership of `id` in one set, then persist that whole set.
    pub async fn toggle(&mut self, kind: ProgressKind, id: &QuestionId) -> ToggleOutcome {
        let is_member = self.sets.toggle(kind, id);
        let persisted = self
            .repo
            .save_ids(kind, self.sets.get(kind))
            .await
            .map_err(|cause| PersistenceError { kind, cause });
        if let Err(err) = &persisted {
            warn!(error = %err, cause = %err.cause, question = %id, "progress change kept in memory only");
        }
        ToggleOutcome {
            is_member,
            persisted,
        }
    }

    /// Drop ids unknown to `catalog` from memory. Returns how many were dropped.
    pub fn prune(&mut self, catalog: &Catalog) -> usize {
        let dropped = self.sets.retain_known(catalog);
        if dropped > 0 {
            warn!(dropped, "ignoring saved progress for unknown questions");
        }
        dropped
    }

    #[must_use]
    pub fn summary(&self, catalog: &Catalog) -> ProgressSummary {
        ProgressSummary::compute(catalog, &self.sets)
    }
}

async fn load_or_empty(repo: &dyn ProgressRepository, kind: ProgressKind) -> HashSet<QuestionId> {
    repo.load_ids(kind).await.unwrap_or_else(|err| {
        warn!(set = %kind, error = %err, "failed to load saved progress; starting empty");
        HashSet::new()
    })
}
