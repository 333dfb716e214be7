use std::collections::HashSet;
use std::fmt;

use crate::catalog::Catalog;
use crate::model::ids::{QuestionId, SubjectId};

/// Which of the two independent progress sets an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressKind {
    Bookmark,
    Studied,
}

impl fmt::Display for ProgressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressKind::Bookmark => f.write_str("bookmarks"),
            ProgressKind::Studied => f.write_str("studied"),
        }
    }
}

/// Bookmarked and studied question ids.
///
/// The two sets are independent: a question may be in both, either or neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressSets {
    bookmarks: HashSet<QuestionId>,
    studied: HashSet<QuestionId>,
}

impl ProgressSets {
    #[must_use]
    pub fn new(bookmarks: HashSet<QuestionId>, studied: HashSet<QuestionId>) -> Self {
        Self { bookmarks, studied }
    }

    #[must_use]
    pub fn get(&self, kind: ProgressKind) -> &HashSet<QuestionId> {
        match kind {
            ProgressKind::Bookmark => &self.bookmarks,
            ProgressKind::Studied => &self.studied,
        }
    }

    fn get_mut(&mut self, kind: ProgressKind) -> &mut HashSet<QuestionId> {
        match kind {
            ProgressKind::Bookmark => &mut self.bookmarks,
            ProgressKind::Studied => &mut self.studied,
        }
    }

    #[must_use]
    pub fn contains(&self, kind: ProgressKind, id: &str) -> bool {
        self.get(kind).contains(id)
    }

    #[must_use]
    pub fn is_bookmarked(&self, id: &str) -> bool {
        self.bookmarks.contains(id)
    }

    #[must_use]
    pub fn is_studied(&self, id: &str) -> bool {
        self.studied.contains(id)
    }

    /// Flip membership of `id` and return the new membership.
    pub fn toggle(&mut self, kind: ProgressKind, id: &QuestionId) -> bool {
        let set = self.get_mut(kind);
        if set.remove(id.as_str()) {
            false
        } else {
            set.insert(id.clone());
            true
        }
    }

    /// Drop ids that are not in the catalog. Returns how many were dropped.
    pub fn retain_known(&mut self, catalog: &Catalog) -> usize {
        let before = self.bookmarks.len() + self.studied.len();
        self.bookmarks.retain(|id| catalog.contains_question(id.as_str()));
        self.studied.retain(|id| catalog.contains_question(id.as_str()));
        before - (self.bookmarks.len() + self.studied.len())
    }
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

/// Studied progress for one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectProgress {
    pub subject_id: SubjectId,
    pub name: String,
    pub studied: usize,
    pub total: usize,
    /// Whole-number percentage, `0` when the subject has no questions.
    pub percentage: u32,
}

/// Overall studied progress plus a per-subject breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSummary {
    pub studied: usize,
    pub bookmarked: usize,
    pub total: usize,
    /// Unrounded percentage, `0.0` when the catalog is empty.
    pub percentage: f64,
    pub subjects: Vec<SubjectProgress>,
}

impl ProgressSummary {
    /// Counts only ids present in the catalog, so the result never exceeds 100%.
    #[must_use]
    pub fn compute(catalog: &Catalog, sets: &ProgressSets) -> Self {
        let questions = catalog.questions();
        let studied = questions
            .iter()
            .filter(|question| sets.is_studied(question.id().as_str()))
            .count();
        let bookmarked = questions
            .iter()
            .filter(|question| sets.is_bookmarked(question.id().as_str()))
            .count();
        let total = questions.len();

        let subjects = catalog
            .subjects()
            .iter()
            .map(|subject| {
                let (studied, total) = catalog
                    .questions_for_subject(subject.id().as_str())
                    .fold((0, 0), |(studied, total), question| {
                        let hit = usize::from(sets.is_studied(question.id().as_str()));
                        (studied + hit, total + 1)
                    });
                SubjectProgress {
                    subject_id: subject.id().clone(),
                    name: subject.display_name().to_owned(),
                    studied,
                    total,
                    percentage: whole_percentage(studied, total),
                }
            })
            .collect();

        Self {
            studied,
            bookmarked,
            total,
            percentage: ratio(studied, total) * 100.0,
            subjects,
        }
    }

    /// Percentage with one decimal place, or `"0"` when there are no questions.
    #[must_use]
    pub fn percentage_label(&self) -> String {
        if self.total == 0 {
            return "0".to_owned();
        }
        format!("{:.1}", self.percentage)
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_percentage(part: usize, total: usize) -> u32 {
    (ratio(part, total) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, Marks, Question, QuestionType, Subject};

    fn catalog() -> Catalog {
        let q = |id: &str, subject: &str| {
            Question::new(
                id,
                subject,
                Marks::Five,
                Difficulty::Easy,
                QuestionType::Definition,
                "text",
            )
        };
        Catalog::new(
            Vec::new(),
            vec![
                Subject::new("const_law", "Constitutional Law").with_short_name("Const"),
                Subject::new("crimes", "Law of Crimes"),
                Subject::new("ipr", "IPR"),
            ],
            vec![q("q1", "const_law"), q("q2", "crimes"), q("q3", "const_law")],
        )
    }

    #[test]
    fn toggle_twice_restores_membership() {
        let mut sets = ProgressSets::default();
        let id = QuestionId::new("q1");
        assert!(sets.toggle(ProgressKind::Bookmark, &id));
        assert!(sets.is_bookmarked("q1"));
        assert!(!sets.toggle(ProgressKind::Bookmark, &id));
        assert_eq!(sets, ProgressSets::default());
    }

    #[test]
    fn bookmark_and_studied_are_independent() {
        let mut sets = ProgressSets::default();
        let id = QuestionId::new("q1");
        sets.toggle(ProgressKind::Studied, &id);
        assert!(sets.is_studied("q1"));
        assert!(!sets.is_bookmarked("q1"));
    }

    #[test]
    fn retain_known_drops_foreign_ids() {
        let mut sets = ProgressSets::new(
            ["q1", "gone"].into_iter().map(QuestionId::from).collect(),
            ["old"].into_iter().map(QuestionId::from).collect(),
        );
        assert_eq!(sets.retain_known(&catalog()), 2);
        assert!(sets.is_bookmarked("q1"));
        assert!(sets.get(ProgressKind::Studied).is_empty());
    }

    #[test]
    fn summary_reports_one_decimal_overall_and_whole_per_subject() {
        let mut sets = ProgressSets::default();
        sets.toggle(ProgressKind::Studied, &QuestionId::new("q1"));

        let summary = ProgressSummary::compute(&catalog(), &sets);
        assert_eq!(summary.studied, 1);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.percentage_label(), "33.3");

        let const_law = &summary.subjects[0];
        assert_eq!(const_law.name, "Const");
        assert_eq!((const_law.studied, const_law.total), (1, 2));
        assert_eq!(const_law.percentage, 50);

        let ipr = &summary.subjects[2];
        assert_eq!((ipr.total, ipr.percentage), (0, 0));
    }

    #[test]
    fn summary_of_empty_catalog_is_zero() {
        let summary = ProgressSummary::compute(&Catalog::default(), &ProgressSets::default());
        assert_eq!(summary.percentage_label(), "0");
        assert!(summary.subjects.is_empty());
    }
}
