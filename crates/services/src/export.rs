//! Question and progress exports.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use csv::{QuoteStyle, WriterBuilder};
use qbank_core::model::{ParseFieldError, ProgressKind, ProgressSets, Question, QuestionId};
use serde::Serialize;

use crate::error::ExportError;

const CSV_HEADER: [&str; 6] = ["ID", "Subject", "Marks", "Difficulty", "Type", "Question"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Every question, pretty-printed JSON.
    Json,
    /// Every question, one row each.
    Csv,
    /// Bookmarked and studied ids with the export time.
    Progress,
}

impl ExportFormat {
    /// Suggested file name for the download.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Json => "llb_questions.json",
            ExportFormat::Csv => "llb_questions.csv",
            ExportFormat::Progress => "llb_progress.json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "progress" => Ok(ExportFormat::Progress),
            _ => Err(ParseFieldError::new("format", s)),
        }
    }
}

/// # Errors
///
/// Returns `ExportError::Json` if serialization fails.
pub fn questions_json(questions: &[Question]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(questions)?)
}

/// Header `ID,Subject,Marks,Difficulty,Type,Question`. Fields are quoted only
/// when needed and embedded quotes are doubled.
///
/// # Errors
///
/// Returns `ExportError` if a row cannot be written.
pub fn questions_csv(questions: &[Question]) -> Result<String, ExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for question in questions {
        let marks = question.marks().value().to_string();
        writer.write_record([
            question.id().as_str(),
            question.subject().as_str(),
            marks.as_str(),
            question.difficulty().as_str(),
            question.question_type().as_str(),
            question.text(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Csv(err.into_error().into()))?;
    Ok(String::from_utf8(bytes)?)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressExport<'a> {
    bookmarks: Vec<&'a str>,
    studied: Vec<&'a str>,
    export_date: String,
}

/// Pretty JSON `{bookmarks, studied, exportDate}` with ids sorted.
///
/// # Errors
///
/// Returns `ExportError::Json` if serialization fails.
pub fn progress_json(sets: &ProgressSets, now: DateTime<Utc>) -> Result<String, ExportError> {
    let export = ProgressExport {
        bookmarks: sorted_ids(sets.get(ProgressKind::Bookmark)),
        studied: sorted_ids(sets.get(ProgressKind::Studied)),
        export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

fn sorted_ids(ids: &HashSet<QuestionId>) -> Vec<&str> {
    let mut sorted: Vec<&str> = ids.iter().map(QuestionId::as_str).collect();
    sorted.sort_unstable();
    sorted
}
