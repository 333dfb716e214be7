use qbank_core::model::{ProgressKind, QuestionId};

/// Capacity of the browser's event channel. Slow subscribers that fall this
/// far behind see `RecvError::Lagged`.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Notifications for the presentation layer to re-render on.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BrowserEvent {
    /// The filtered result list was recomputed.
    ResultsChanged {
        total_count: usize,
        page: usize,
        total_pages: usize,
    },
    PageChanged {
        page: usize,
    },
    BookmarkChanged {
        question_id: QuestionId,
        bookmarked: bool,
    },
    StudiedChanged {
        question_id: QuestionId,
        studied: bool,
    },
    /// A progress set could not be written; the in-memory change stands.
    PersistenceFailed {
        kind: ProgressKind,
        message: String,
    },
    QuestionAdded {
        question_id: QuestionId,
    },
}
