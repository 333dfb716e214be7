//! Filter and search over the catalog's questions.
//!
//! Everything here is a pure function of the questions, the criteria, the
//! search text and the progress sets. Results keep catalog order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{
    Difficulty, ParseFieldError, ProgressKind, ProgressSets, Question, QuestionType, SubjectId,
};

/// How many matches the search dropdown shows.
pub const SEARCH_PREVIEW_LIMIT: usize = 10;

/// Constraint on the user's own progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusFilter {
    Studied,
    NotStudied,
    Bookmarked,
}

impl StatusFilter {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::Studied => "studied",
            StatusFilter::NotStudied => "not-studied",
            StatusFilter::Bookmarked => "bookmarked",
        }
    }

    /// True if toggling `kind` can change what this filter keeps.
    #[must_use]
    pub fn depends_on(self, kind: ProgressKind) -> bool {
        match self {
            StatusFilter::Studied | StatusFilter::NotStudied => kind == ProgressKind::Studied,
            StatusFilter::Bookmarked => kind == ProgressKind::Bookmark,
        }
    }

    fn keeps(self, question: &Question, progress: &ProgressSets) -> bool {
        let id = question.id().as_str();
        match self {
            StatusFilter::Studied => progress.is_studied(id),
            StatusFilter::NotStudied => !progress.is_studied(id),
            StatusFilter::Bookmarked => progress.is_bookmarked(id),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "studied" => Ok(StatusFilter::Studied),
            "not-studied" | "not_studied" => Ok(StatusFilter::NotStudied),
            "bookmarked" => Ok(StatusFilter::Bookmarked),
            other => Err(ParseFieldError::new("status", other)),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names one field of [`FilterCriteria`], for removing a single constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Subject,
    Marks,
    Difficulty,
    Type,
    Status,
}

/// Independently optional equality constraints. `None` means unconstrained.
///
/// `marks` is a raw integer so that a value outside the known buckets simply
/// matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub subject: Option<SubjectId>,
    pub marks: Option<u8>,
    pub difficulty: Option<Difficulty>,
    pub question_type: Option<QuestionType>,
    pub status: Option<StatusFilter>,
}

impl FilterCriteria {
    #[must_use]
    pub fn subject(subject: impl Into<SubjectId>) -> Self {
        Self {
            subject: Some(subject.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn clear(&mut self, field: FilterField) {
        match field {
            FilterField::Subject => self.subject = None,
            FilterField::Marks => self.marks = None,
            FilterField::Difficulty => self.difficulty = None,
            FilterField::Type => self.question_type = None,
            FilterField::Status => self.status = None,
        }
    }

    #[must_use]
    pub fn matches(&self, question: &Question, progress: &ProgressSets) -> bool {
        if self
            .subject
            .as_ref()
            .is_some_and(|subject| subject != question.subject())
        {
            return false;
        }
        if self
            .marks
            .is_some_and(|marks| marks != question.marks().value())
        {
            return false;
        }
        if self
            .difficulty
            .is_some_and(|difficulty| difficulty != question.difficulty())
        {
            return false;
        }
        if self
            .question_type
            .is_some_and(|question_type| question_type != question.question_type())
        {
            return false;
        }
        self.status
            .is_none_or(|status| status.keeps(question, progress))
    }
}

/// Free-text search. Whitespace-only input is the same as no search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    needle: Option<String>,
}

impl SearchQuery {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let text = raw.trim().to_owned();
        let needle = (!text.is_empty()).then(|| text.to_lowercase());
        Self { text, needle }
    }

    /// The trimmed text as entered.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.needle.is_some()
    }

    #[must_use]
    pub fn matches(&self, question: &Question) -> bool {
        self.needle
            .as_deref()
            .is_none_or(|needle| question.matches_needle(needle))
    }
}

/// Indices into `questions` of every question passing the criteria and search.
#[must_use]
pub fn run_query(
    questions: &[Question],
    criteria: &FilterCriteria,
    search: &SearchQuery,
    progress: &ProgressSets,
) -> Vec<usize> {
    questions
        .iter()
        .enumerate()
        .filter(|(_, question)| criteria.matches(question, progress) && search.matches(question))
        .map(|(index, _)| index)
        .collect()
}

/// First `limit` search hits over all questions, ignoring filters.
#[must_use]
pub fn search_preview<'a>(
    questions: &'a [Question],
    search: &SearchQuery,
    limit: usize,
) -> Vec<&'a Question> {
    if !search.is_active() {
        return Vec::new();
    }
    questions
        .iter()
        .filter(|question| search.matches(question))
        .take(limit)
        .collect()
}
