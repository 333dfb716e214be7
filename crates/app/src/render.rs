//! Plain-text rendering of browser output.

use std::fmt::Write as _;

use qbank_core::model::{ProgressSummary, Question};
use qbank_core::{Catalog, CatalogStats, PageLink};
use services::{FilteredPage, QuestionBrowser};

pub fn question_line(browser: &QuestionBrowser, question: &Question) -> String {
    let catalog = browser.catalog();
    let subject = catalog
        .find_subject(question.subject().as_str())
        .map_or(question.subject().as_str(), |subject| subject.display_name());
    let mut flags = String::new();
    if browser.is_bookmarked(question.id().as_str()) {
        flags.push_str(" [bookmarked]");
    }
    if browser.is_studied(question.id().as_str()) {
        flags.push_str(" [studied]");
    }
    format!(
        "{id}  {marks} Marks | {difficulty} | {kind} | {subject}{flags}\n    {text}",
        id = question.id(),
        marks = question.marks(),
        difficulty = question.difficulty().label(),
        kind = question.question_type().label(),
        text = question.text(),
    )
}

pub fn page(browser: &QuestionBrowser, page: &FilteredPage<'_>) -> String {
    let mut out = String::new();
    if page.items.is_empty() {
        out.push_str("No questions match the current filters.\n");
    }
    for question in &page.items {
        let _ = writeln!(out, "{}", question_line(browser, question));
    }
    let _ = writeln!(
        out,
        "\n{} questions, page {} of {}  {}",
        page.total_count,
        page.page,
        page.total_pages,
        page_bar(&browser.page_links())
    );
    out
}

pub fn page_bar(links: &[PageLink]) -> String {
    links
        .iter()
        .map(|link| match link {
            PageLink::Page(n) => n.to_string(),
            PageLink::Ellipsis => "...".to_owned(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn progress(summary: &ProgressSummary) -> String {
    let mut out = format!(
        "Studied {} of {} ({}%), {} bookmarked\n",
        summary.studied,
        summary.total,
        summary.percentage_label(),
        summary.bookmarked
    );
    for subject in &summary.subjects {
        let _ = writeln!(
            out,
            "  {:<32} {:>4}/{:<4} {:>3}%",
            subject.name, subject.studied, subject.total, subject.percentage
        );
    }
    out
}

pub fn stats(catalog: &Catalog, stats: &CatalogStats) -> String {
    let mut out = format!("{} questions\n", stats.total_questions);
    for (marks, count) in &stats.by_marks {
        let _ = writeln!(out, "  {:<24} {count}", marks.category_label());
    }
    for (subject_id, count) in &stats.by_subject {
        let name = catalog
            .find_subject(subject_id.as_str())
            .map_or(subject_id.as_str(), |subject| subject.name());
        let _ = writeln!(out, "  {name:<32} {count}");
    }
    if let Some(semester) = catalog.active_semester() {
        let _ = writeln!(out, "Active semester: {}", semester.display_name());
    }
    out
}

/// Semester roadmap: status badge, launch month and description, plus the
/// loaded totals under the active semester.
pub fn semesters(catalog: &Catalog) -> String {
    let mut out = String::new();
    if catalog.semesters().is_empty() {
        out.push_str("No semesters loaded.\n");
    }
    for semester in catalog.semesters() {
        let _ = write!(
            out,
            "[{}] {}",
            semester.status().label(),
            semester.display_name()
        );
        if let Some(launch) = semester.launch_label() {
            let _ = write!(out, " ({launch})");
        }
        out.push('\n');
        if let Some(description) = semester.description() {
            let _ = writeln!(out, "    {description}");
        }
        if semester.is_active() {
            let _ = writeln!(
                out,
                "    {} subjects, {} questions",
                catalog.subjects().len(),
                catalog.len()
            );
        }
    }
    out
}

/// Subject grid: short name, full name, colour, loaded count and studied %.
pub fn subjects(catalog: &Catalog, summary: &ProgressSummary) -> String {
    let mut out = String::new();
    if summary.subjects.is_empty() {
        out.push_str("No subjects loaded.\n");
    }
    for progress in &summary.subjects {
        let subject = catalog.find_subject(progress.subject_id.as_str());
        let full_name = subject.map_or(progress.name.as_str(), |subject| subject.name());
        let short_name = subject
            .and_then(|subject| subject.short_name())
            .unwrap_or(progress.name.as_str());
        let color = subject.map_or("", |subject| subject.color());
        let _ = writeln!(
            out,
            "{:<8} {:<40} {:<8} {:>4} questions {:>3}% studied",
            short_name, full_name, color, progress.total, progress.percentage
        );
    }
    out
}
