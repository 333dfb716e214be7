use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{QuestionId, SemesterId, SubjectId};
use crate::model::subject::Subject;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Rejection reasons for an admin-authored question.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("unknown subject: {0}")]
    UnknownSubject(SubjectId),
}

/// Failure to parse one of the enumerated question fields from text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {field}: {raw}")]
pub struct ParseFieldError {
    field: &'static str,
    raw: String,
}

impl ParseFieldError {
    #[must_use]
    pub fn new(field: &'static str, raw: impl Into<String>) -> Self {
        Self {
            field,
            raw: raw.into(),
        }
    }

    #[must_use]
    pub fn field(&self) -> &'static str {
        self.field
    }
}

//
// ─── ENUMERATED FIELDS ─────────────────────────────────────────────────────────
//

/// Mark weight of a question. Serialized as the bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Marks {
    Five,
    Ten,
    Fifteen,
}

impl Marks {
    /// Buckets in the order statistics are reported (largest first).
    pub const ALL: [Marks; 3] = [Marks::Fifteen, Marks::Ten, Marks::Five];

    #[must_use]
    pub fn value(self) -> u8 {
        match self {
            Marks::Five => 5,
            Marks::Ten => 10,
            Marks::Fifteen => 15,
        }
    }

    /// Category label used when a question does not carry its own.
    #[must_use]
    pub fn category_label(self) -> &'static str {
        match self {
            Marks::Fifteen => "Long Question",
            Marks::Ten => "Medium Question",
            Marks::Five => "Short Question",
        }
    }
}

impl TryFrom<u8> for Marks {
    type Error = ParseFieldError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            5 => Ok(Marks::Five),
            10 => Ok(Marks::Ten),
            15 => Ok(Marks::Fifteen),
            other => Err(ParseFieldError::new("marks", other.to_string())),
        }
    }
}

impl From<Marks> for u8 {
    fn from(value: Marks) -> Self {
        value.value()
    }
}

impl FromStr for Marks {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .map_err(|_| ParseFieldError::new("marks", s))
            .and_then(Marks::try_from)
    }
}

impl fmt::Display for Marks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseFieldError::new("difficulty", s)),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Definition,
    Analytical,
    Comparative,
    Statutory,
    CaseLaw,
    Problem,
}

impl QuestionType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Definition => "definition",
            QuestionType::Analytical => "analytical",
            QuestionType::Comparative => "comparative",
            QuestionType::Statutory => "statutory",
            QuestionType::CaseLaw => "case_law",
            QuestionType::Problem => "problem",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::Definition => "Definition",
            QuestionType::Analytical => "Analytical",
            QuestionType::Comparative => "Comparative",
            QuestionType::Statutory => "Statutory",
            QuestionType::CaseLaw => "Case Law",
            QuestionType::Problem => "Problem-Based",
        }
    }
}

impl FromStr for QuestionType {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "definition" => Ok(QuestionType::Definition),
            "analytical" => Ok(QuestionType::Analytical),
            "comparative" => Ok(QuestionType::Comparative),
            "statutory" => Ok(QuestionType::Statutory),
            "case_law" | "case-law" => Ok(QuestionType::CaseLaw),
            "problem" => Ok(QuestionType::Problem),
            _ => Err(ParseFieldError::new("question type", s)),
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Source label used for questions authored at runtime.
pub const ADMIN_SOURCE: &str = "Admin Added";

/// A single exam question as loaded from static data.
///
/// Immutable after construction; the catalog only ever appends new ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    id: QuestionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    semester: Option<SemesterId>,
    subject: SubjectId,
    marks: Marks,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(rename = "type")]
    question_type: QuestionType,
    difficulty: Difficulty,
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(default)]
    verified: bool,
}

impl Question {
    #[must_use]
    pub fn new(
        id: impl Into<QuestionId>,
        subject: impl Into<SubjectId>,
        marks: Marks,
        difficulty: Difficulty,
        question_type: QuestionType,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            semester: None,
            subject: subject.into(),
            marks,
            category: None,
            question_type,
            difficulty,
            text: text.into(),
            keywords: None,
            source: None,
            verified: false,
        }
    }

    #[must_use]
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = Some(keywords.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_semester(mut self, semester: impl Into<SemesterId>) -> Self {
        self.semester = Some(semester.into());
        self
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn semester(&self) -> Option<&SemesterId> {
        self.semester.as_ref()
    }

    #[must_use]
    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    #[must_use]
    pub fn marks(&self) -> Marks {
        self.marks
    }

    /// The stored category, or the one implied by the mark weight.
    #[must_use]
    pub fn category(&self) -> &str {
        self.category
            .as_deref()
            .unwrap_or_else(|| self.marks.category_label())
    }

    #[must_use]
    pub fn question_type(&self) -> QuestionType {
        self.question_type
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn keywords(&self) -> &[String] {
        self.keywords.as_deref().unwrap_or(&[])
    }

    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    #[must_use]
    pub fn source_label(&self) -> &str {
        self.source.as_deref().unwrap_or("Exam Question")
    }

    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// True if the text or any keyword contains `needle`.
    ///
    /// `needle` must already be lower-cased.
    #[must_use]
    pub fn matches_needle(&self, needle: &str) -> bool {
        self.text.to_lowercase().contains(needle)
            || self
                .keywords()
                .iter()
                .any(|keyword| keyword.to_lowercase().contains(needle))
    }

    /// Plain-text rendering used for the clipboard.
    #[must_use]
    pub fn clipboard_text(&self, subject: Option<&Subject>) -> String {
        let subject_name = subject.map_or(self.subject.as_str(), Subject::name);
        format!("[{} Marks - {}]\n\n{}", self.marks, subject_name, self.text)
    }
}

//
// ─── DRAFTS ────────────────────────────────────────────────────────────────────
//

/// Unvalidated input for a question authored at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub subject: SubjectId,
    pub marks: Marks,
    pub difficulty: Difficulty,
    pub question_type: QuestionType,
    pub text: String,
}

impl QuestionDraft {
    /// Trim and check the draft.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyText` if the text is blank.
    pub fn validate(self) -> Result<ValidatedQuestion, ValidationError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText);
        }

        Ok(ValidatedQuestion {
            subject: self.subject,
            marks: self.marks,
            difficulty: self.difficulty,
            question_type: self.question_type,
            text: text.to_owned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuestion {
    pub subject: SubjectId,
    pub marks: Marks,
    pub difficulty: Difficulty,
    pub question_type: QuestionType,
    pub text: String,
}

impl ValidatedQuestion {
    pub fn assign_id(self, id: QuestionId, semester: SemesterId) -> Question {
        Question {
            id,
            semester: Some(semester),
            subject: self.subject,
            marks: self.marks,
            category: Some(self.marks.category_label().to_owned()),
            question_type: self.question_type,
            difficulty: self.difficulty,
            text: self.text,
            keywords: Some(Vec::new()),
            source: Some(ADMIN_SOURCE.to_owned()),
            verified: false,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
