use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::model::{
    Marks, Question, QuestionDraft, QuestionId, Semester, SemesterId, Subject, SubjectId,
    ValidationError,
};

/// Semester marker used for new questions when no semester is active.
pub const DEFAULT_SEMESTER: &str = "sem1";

/// A subject whose declared question count disagrees with the loaded data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountMismatch {
    pub subject_id: SubjectId,
    pub declared: u32,
    pub actual: usize,
}

/// Aggregate counts derived from the loaded questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogStats {
    pub total_questions: usize,
    /// One entry per mark bucket, largest first.
    pub by_marks: Vec<(Marks, usize)>,
    /// One entry per subject, in catalog order.
    pub by_subject: Vec<(SubjectId, usize)>,
}

/// Loaded semesters, subjects and questions.
///
/// Populated once at startup; afterwards questions can only be appended.
/// Lookups return `None` rather than failing since callers routinely probe
/// for foreign keys that may be missing.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    semesters: Vec<Semester>,
    subjects: Vec<Subject>,
    questions: Vec<Question>,
    question_index: HashMap<QuestionId, usize>,
}

impl Catalog {
    /// Build a catalog. Questions whose id repeats an earlier one are dropped.
    #[must_use]
    pub fn new(semesters: Vec<Semester>, subjects: Vec<Subject>, questions: Vec<Question>) -> Self {
        let mut catalog = Self {
            semesters,
            subjects,
            questions: Vec::with_capacity(questions.len()),
            question_index: HashMap::with_capacity(questions.len()),
        };
        for question in questions {
            catalog.push(question);
        }
        catalog
    }

    fn push(&mut self, question: Question) -> bool {
        if self.question_index.contains_key(question.id()) {
            return false;
        }
        self.question_index
            .insert(question.id().clone(), self.questions.len());
        self.questions.push(question);
        true
    }

    #[must_use]
    pub fn semesters(&self) -> &[Semester] {
        &self.semesters
    }

    #[must_use]
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn find_subject(&self, id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|subject| subject.id().as_str() == id)
    }

    #[must_use]
    pub fn find_question(&self, id: &str) -> Option<&Question> {
        self.question_index
            .get(id)
            .and_then(|&index| self.questions.get(index))
    }

    #[must_use]
    pub fn contains_question(&self, id: &str) -> bool {
        self.question_index.contains_key(id)
    }

    /// The first semester flagged active.
    #[must_use]
    pub fn active_semester(&self) -> Option<&Semester> {
        self.semesters.iter().find(|semester| semester.is_active())
    }

    /// Questions belonging to one subject, in catalog order.
    pub fn questions_for_subject<'a>(
        &'a self,
        subject_id: &'a str,
    ) -> impl Iterator<Item = &'a Question> + 'a {
        self.questions
            .iter()
            .filter(move |question| question.subject().as_str() == subject_id)
    }

    /// Subjects whose declared question count does not match the loaded questions.
    #[must_use]
    pub fn count_mismatches(&self) -> Vec<CountMismatch> {
        self.subjects
            .iter()
            .filter_map(|subject| {
                let actual = self.questions_for_subject(subject.id().as_str()).count();
                let declared = subject.question_count();
                (usize::try_from(declared).ok() != Some(actual)).then(|| CountMismatch {
                    subject_id: subject.id().clone(),
                    declared,
                    actual,
                })
            })
            .collect()
    }

    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        let by_marks = Marks::ALL
            .iter()
            .map(|&marks| {
                let count = self
                    .questions
                    .iter()
                    .filter(|question| question.marks() == marks)
                    .count();
                (marks, count)
            })
            .collect();
        let by_subject = self
            .subjects
            .iter()
            .map(|subject| {
                let count = self.questions_for_subject(subject.id().as_str()).count();
                (subject.id().clone(), count)
            })
            .collect();

        CatalogStats {
            total_questions: self.questions.len(),
            by_marks,
            by_subject,
        }
    }

    /// Validate a draft and append it with a freshly generated id.
    ///
    /// The id has the form `q_<semester>_<subject>_<unix millis>`; a numeric
    /// suffix is added if that id is already taken.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyText` for blank text and
    /// `ValidationError::UnknownSubject` if the subject is not in the catalog.
    /// The catalog is unchanged on error.
    pub fn append_question(
        &mut self,
        draft: QuestionDraft,
        now: DateTime<Utc>,
    ) -> Result<QuestionId, ValidationError> {
        let validated = draft.validate()?;
        if self.find_subject(validated.subject.as_str()).is_none() {
            return Err(ValidationError::UnknownSubject(validated.subject));
        }

        let semester = self
            .active_semester()
            .map_or_else(|| SemesterId::new(DEFAULT_SEMESTER), |sem| sem.id().clone());
        let id = self.fresh_question_id(&semester, &validated.subject, now);
        let question = validated.assign_id(id.clone(), semester);
        self.push(question);
        Ok(id)
    }

    fn fresh_question_id(
        &self,
        semester: &SemesterId,
        subject: &SubjectId,
        now: DateTime<Utc>,
    ) -> QuestionId {
        let base = format!("q_{semester}_{subject}_{}", now.timestamp_millis());
        if !self.contains_question(&base) {
            return QuestionId::new(base);
        }
        let mut suffix = 2_u32;
        loop {
            let candidate = format!("{base}_{suffix}");
            if !self.contains_question(&candidate) {
                return QuestionId::new(candidate);
            }
            suffix += 1;
        }
    }
}
