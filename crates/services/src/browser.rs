//! Application-state root behind the presentation layer.
//!
//! `QuestionBrowser` owns the catalog, the progress sets, the current filters
//! and search, and the pagination cursor. Every intent is a method call; the
//! presentation layer reads derived output through `filtered_page` and learns
//! about changes from `subscribe`.

use std::sync::Arc;

use qbank_core::model::{ProgressKind, ProgressSummary, Question, QuestionDraft, QuestionId};
use qbank_core::pagination::{PageLink, Pagination, page_links};
use qbank_core::query::{SEARCH_PREVIEW_LIMIT, run_query, search_preview};
use qbank_core::{Catalog, CatalogStats, Clock, FilterCriteria, FilterField, SearchQuery};
use storage::catalog_source::{CatalogSource, DataLoadError};
use storage::repository::ProgressRepository;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::catalog_loader::load_catalog;
use crate::config::BrowserConfig;
use crate::debounce::Debouncer;
use crate::error::BrowserError;
use crate::events::{BrowserEvent, EVENT_CHANNEL_CAPACITY};
use crate::export::{self, ExportFormat};
use crate::progress_tracker::ProgressTracker;

/// One page of the filtered result list.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredPage<'a> {
    pub items: Vec<&'a Question>,
    pub page: usize,
    pub total_pages: usize,
    pub total_count: usize,
}

/// A ready browser plus the sources that failed to load.
pub struct Startup {
    pub browser: QuestionBrowser,
    pub load_errors: Vec<DataLoadError>,
}

impl Startup {
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.load_errors.is_empty()
    }
}

pub struct QuestionBrowser {
    catalog: Catalog,
    progress: ProgressTracker,
    criteria: FilterCriteria,
    search: SearchQuery,
    pending_search: Debouncer<String>,
    results: Vec<usize>,
    pagination: Pagination,
    clock: Clock,
    events: broadcast::Sender<BrowserEvent>,
}

impl QuestionBrowser {
    /// Load the catalog and saved progress, then compute the initial view.
    ///
    /// Source failures do not abort startup; they are returned alongside the
    /// browser. Saved ids unknown to the catalog are dropped only when every
    /// source loaded, so progress for a missing question set survives.
    pub async fn open(
        source: &dyn CatalogSource,
        repo: Arc<dyn ProgressRepository>,
        config: BrowserConfig,
        clock: Clock,
    ) -> Startup {
        let (loaded, mut progress) =
            futures::join!(load_catalog(source), ProgressTracker::hydrate(repo));
        if !loaded.is_degraded() {
            progress.prune(&loaded.catalog);
        }
        let browser = Self::new(loaded.catalog, progress, config, clock);
        info!(
            results = browser.results.len(),
            degraded = !loaded.errors.is_empty(),
            "question browser ready"
        );
        Startup {
            browser,
            load_errors: loaded.errors,
        }
    }

    #[must_use]
    pub fn new(
        catalog: Catalog,
        progress: ProgressTracker,
        config: BrowserConfig,
        clock: Clock,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let mut browser = Self {
            catalog,
            progress,
            criteria: FilterCriteria::default(),
            search: SearchQuery::default(),
            pending_search: Debouncer::new(config.search_debounce),
            results: Vec::new(),
            pagination: Pagination::new(config.page_size),
            clock,
            events,
        };
        browser.refresh_results();
        browser
    }

    /// Receive change notifications from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BrowserEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    #[must_use]
    pub fn search_text(&self) -> &str {
        self.search.text()
    }

    //
    // ─── READ MODEL ────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn filtered_page(&self) -> FilteredPage<'_> {
        let questions = self.catalog.questions();
        let items = self
            .pagination
            .slice(&self.results)
            .iter()
            .filter_map(|&index| questions.get(index))
            .collect();
        FilteredPage {
            items,
            page: self.pagination.page(),
            total_pages: self.pagination.total_pages(self.results.len()),
            total_count: self.results.len(),
        }
    }

    #[must_use]
    pub fn page_links(&self) -> Vec<PageLink> {
        page_links(
            self.pagination.page(),
            self.pagination.total_pages(self.results.len()),
        )
    }

    #[must_use]
    pub fn progress_summary(&self) -> ProgressSummary {
        self.progress.summary(&self.catalog)
    }

    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        self.catalog.stats()
    }

    #[must_use]
    pub fn is_bookmarked(&self, id: &str) -> bool {
        self.progress.is_bookmarked(id)
    }

    #[must_use]
    pub fn is_studied(&self, id: &str) -> bool {
        self.progress.is_studied(id)
    }

    /// Bookmarked questions in catalog order.
    #[must_use]
    pub fn bookmarked_questions(&self) -> Vec<&Question> {
        self.catalog
            .questions()
            .iter()
            .filter(|question| self.progress.is_bookmarked(question.id().as_str()))
            .collect()
    }

    /// Top matches for `text` over the whole catalog, ignoring filters.
    #[must_use]
    pub fn search_preview(&self, text: &str) -> Vec<&Question> {
        search_preview(
            self.catalog.questions(),
            &SearchQuery::new(text),
            SEARCH_PREVIEW_LIMIT,
        )
    }

    /// Clipboard rendering of a question, or `None` if the id is unknown.
    #[must_use]
    pub fn clipboard_text(&self, id: &str) -> Option<String> {
        let question = self.catalog.find_question(id)?;
        let subject = self.catalog.find_subject(question.subject().as_str());
        Some(question.clipboard_text(subject))
    }

    /// # Errors
    ///
    /// Returns `BrowserError::Export` if rendering fails.
    pub fn export(&self, format: ExportFormat) -> Result<String, BrowserError> {
        let rendered = match format {
            ExportFormat::Json => export::questions_json(self.catalog.questions())?,
            ExportFormat::Csv => export::questions_csv(self.catalog.questions())?,
            ExportFormat::Progress => {
                export::progress_json(self.progress.sets(), self.clock.now())?
            }
        };
        Ok(rendered)
    }

    //
    // ─── FILTERS AND SEARCH ────────────────────────────────────────────────────
    //

    /// Replace the filter criteria and go back to page 1.
    pub fn set_filter(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.restart_results();
    }

    /// Clear one criterion and go back to page 1.
    pub fn remove_filter(&mut self, field: FilterField) {
        self.criteria.clear(field);
        self.restart_results();
    }

    /// Apply search text immediately, superseding any pending keystrokes.
    pub fn set_search(&mut self, text: &str) {
        self.pending_search.cancel();
        self.search = SearchQuery::new(text);
        self.restart_results();
    }

    pub fn clear_search(&mut self) {
        self.set_search("");
    }

    /// Drop every criterion and the search.
    pub fn clear_filters(&mut self) {
        self.pending_search.cancel();
        self.criteria = FilterCriteria::default();
        self.search = SearchQuery::default();
        self.restart_results();
    }

    /// Record a keystroke. The search runs once input has been idle for the
    /// configured delay; each call restarts the wait.
    pub fn input_search(&mut self, text: impl Into<String>) {
        self.pending_search.schedule(text.into(), Instant::now());
    }

    /// Apply the pending search if its idle delay has elapsed.
    ///
    /// Returns `true` if a search was applied.
    pub fn apply_due_search(&mut self) -> bool {
        match self.pending_search.take_due(Instant::now()) {
            Some(text) => {
                self.set_search(&text);
                true
            }
            None => false,
        }
    }

    /// Wait for the pending search's idle delay, then apply it.
    ///
    /// Returns `true` if a search was applied.
    pub async fn settle_search(&mut self) -> bool {
        match self.pending_search.settle().await {
            Some(text) => {
                self.set_search(&text);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn has_pending_search(&self) -> bool {
        self.pending_search.is_pending()
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────────
    //

    /// Move to page `n`; out-of-range requests are ignored.
    ///
    /// Returns `true` if the page changed.
    pub fn go_to_page(&mut self, n: usize) -> bool {
        if !self.pagination.go_to(n, self.results.len()) {
            debug!(requested = n, "ignored out-of-range page");
            return false;
        }
        self.publish(BrowserEvent::PageChanged { page: n });
        true
    }

    //
    // ─── PROGRESS ──────────────────────────────────────────────────────────────
    //

    /// Flip the bookmark on a question and return the new state.
    ///
    /// Unknown ids are ignored and report `false`.
    pub async fn toggle_bookmark(&mut self, id: &str) -> bool {
        self.toggle(ProgressKind::Bookmark, id).await
    }

    /// Flip the studied mark on a question and return the new state.
    ///
    /// Unknown ids are ignored and report `false`.
    pub async fn toggle_studied(&mut self, id: &str) -> bool {
        self.toggle(ProgressKind::Studied, id).await
    }

    async fn toggle(&mut self, kind: ProgressKind, id: &str) -> bool {
        let Some(question_id) = self.catalog.find_question(id).map(|q| q.id().clone()) else {
            debug!(question = id, set = %kind, "ignored toggle for unknown question");
            return false;
        };

        let outcome = self.progress.toggle(kind, &question_id).await;
        if let Err(err) = outcome.persisted {
            self.publish(BrowserEvent::PersistenceFailed {
                kind,
                message: err.cause.to_string(),
            });
        }

        let is_member = outcome.is_member;
        self.publish(match kind {
            ProgressKind::Bookmark => BrowserEvent::BookmarkChanged {
                question_id,
                bookmarked: is_member,
            },
            ProgressKind::Studied => BrowserEvent::StudiedChanged {
                question_id,
                studied: is_member,
            },
        });

        if self
            .criteria
            .status
            .is_some_and(|status| status.depends_on(kind))
        {
            self.refresh_results();
        }
        is_member
    }

    //
    // ─── AUTHORING ─────────────────────────────────────────────────────────────
    //

    /// Validate and append a question, then recompute the view in place.
    ///
    /// # Errors
    ///
    /// Returns `BrowserError::Validation` if the draft is rejected; the
    /// catalog is unchanged in that case.
    pub fn add_question(&mut self, draft: QuestionDraft) -> Result<QuestionId, BrowserError> {
        let id = self
            .catalog
            .append_question(draft, self.clock.now())
            .inspect_err(|err| warn!(error = %err, "rejected new question"))?;
        info!(question = %id, "question added");
        self.publish(BrowserEvent::QuestionAdded {
            question_id: id.clone(),
        });
        self.refresh_results();
        Ok(id)
    }

    //
    // ─── INTERNALS ─────────────────────────────────────────────────────────────
    //

    fn restart_results(&mut self) {
        self.pagination.reset();
        self.refresh_results();
    }

    /// Re-run the query and keep the current page, clamped into range.
    fn refresh_results(&mut self) {
        self.results = run_query(
            self.catalog.questions(),
            &self.criteria,
            &self.search,
            self.progress.sets(),
        );
        self.pagination.clamp(self.results.len());
        debug!(
            results = self.results.len(),
            page = self.pagination.page(),
            search = self.search.text(),
            "query re-run"
        );
        self.publish(BrowserEvent::ResultsChanged {
            total_count: self.results.len(),
            page: self.pagination.page(),
            total_pages: self.pagination.total_pages(self.results.len()),
        });
    }

    fn publish(&self, event: BrowserEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbank_core::StatusFilter;
    use qbank_core::model::{Difficulty, Marks, QuestionType, Subject};
    use qbank_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn numbered(count: usize) -> Catalog {
        let questions = (1..=count)
            .map(|n| {
                Question::new(
                    format!("q{n}"),
                    "ipr",
                    Marks::Five,
                    Difficulty::Easy,
                    QuestionType::Definition,
                    format!("Question number {n}"),
                )
            })
            .collect();
        Catalog::new(Vec::new(), vec![Subject::new("ipr", "IPR")], questions)
    }

    fn browser(catalog: Catalog) -> QuestionBrowser {
        let tracker = ProgressTracker::new(Arc::new(InMemoryRepository::new()));
        QuestionBrowser::new(catalog, tracker, BrowserConfig::default(), fixed_clock())
    }

    #[test]
    fn filter_change_resets_to_first_page() {
        let mut browser = browser(numbered(45));
        assert!(browser.go_to_page(3));
        browser.set_filter(FilterCriteria::subject("ipr"));
        let page = browser.filtered_page();
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 20);
    }

    #[test]
    fn last_page_holds_the_remainder() {
        let mut browser = browser(numbered(45));
        assert!(browser.go_to_page(3));
        let page = browser.filtered_page();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].id().as_str(), "q41");
    }

    #[tokio::test]
    async fn toggle_under_status_filter_keeps_clamped_page() {
        let mut browser = browser(numbered(25));
        for n in 1..=25 {
            browser.toggle_bookmark(&format!("q{n}")).await;
        }
        browser.set_filter(FilterCriteria {
            status: Some(StatusFilter::Bookmarked),
            ..FilterCriteria::default()
        });
        assert!(browser.go_to_page(2));

        for n in 21..=25 {
            assert!(!browser.toggle_bookmark(&format!("q{n}")).await);
        }
        let page = browser.filtered_page();
        assert_eq!(page.total_count, 20);
        assert_eq!(page.page, 1);
    }

    #[tokio::test]
    async fn unknown_ids_are_ignored() {
        let mut browser = browser(numbered(2));
        assert!(!browser.toggle_studied("missing").await);
        assert_eq!(browser.progress_summary().studied, 0);
        assert_eq!(browser.clipboard_text("missing"), None);
    }

    #[test]
    fn clipboard_text_uses_subject_name() {
        let browser = browser(numbered(1));
        assert_eq!(
            browser.clipboard_text("q1").as_deref(),
            Some("[5 Marks - IPR]\n\nQuestion number 1")
        );
    }

    #[test]
    fn clear_filters_drops_search_and_criteria() {
        let mut browser = browser(numbered(30));
        browser.set_search("number 1");
        browser.set_filter(FilterCriteria::subject("other"));
        assert_eq!(browser.filtered_page().total_count, 0);

        browser.clear_filters();
        assert_eq!(browser.filtered_page().total_count, 30);
        assert_eq!(browser.search_text(), "");
    }
}
