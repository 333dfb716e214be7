//! Startup fan-out over the static data sources.

use futures::future::join_all;
use qbank_core::Catalog;
use storage::catalog_source::{CatalogSource, DataLoadError};
use tracing::{info, warn};

/// Result of a startup load. `errors` lists every source that failed; the
/// catalog holds whatever the other sources produced.
#[derive(Debug, Clone, Default)]
pub struct LoadedCatalog {
    pub catalog: Catalog,
    pub errors: Vec<DataLoadError>,
}

impl LoadedCatalog {
    /// True if at least one source failed.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Fetch every source and assemble the catalog.
///
/// Semesters and subjects are fetched together, then one question set per
/// subject in parallel. When the subject list is unavailable the question sets
/// are discovered from the source instead. Failures never abort the load.
pub async fn load_catalog(source: &dyn CatalogSource) -> LoadedCatalog {
    let mut errors = Vec::new();

    let (semesters, subjects) = futures::join!(source.semesters(), source.subjects());
    let semesters = semesters.unwrap_or_else(|err| {
        warn!(error = %err, "failed to load semesters");
        errors.push(err);
        Vec::new()
    });

    let (subjects, sets) = match subjects {
        Ok(subjects) => {
            let sets = subjects
                .iter()
                .map(|subject| subject.id().as_str().to_owned())
                .collect();
            (subjects, sets)
        }
        Err(err) => {
            warn!(error = %err, "failed to load subjects; discovering question sets");
            errors.push(err);
            let sets = source.question_sets().await.unwrap_or_else(|err| {
                warn!(error = %err, "failed to enumerate question sets");
                errors.push(err);
                Vec::new()
            });
            (Vec::new(), sets)
        }
    };

    let fetched = join_all(sets.iter().map(|set| source.questions(set))).await;
    let mut questions = Vec::new();
    for (set, outcome) in sets.iter().zip(fetched) {
        match outcome {
            Ok(batch) => questions.extend(batch),
            Err(err) => {
                warn!(set = %set, error = %err, "failed to load question set");
                errors.push(err);
            }
        }
    }

    let loaded = questions.len();
    let catalog = Catalog::new(semesters, subjects, questions);
    if catalog.len() < loaded {
        warn!(
            dropped = loaded - catalog.len(),
            "dropped questions with duplicate ids"
        );
    }
    for mismatch in catalog.count_mismatches() {
        warn!(
            subject = %mismatch.subject_id,
            declared = mismatch.declared,
            actual = mismatch.actual,
            "subject question count does not match loaded questions"
        );
    }

    info!(
        semesters = catalog.semesters().len(),
        subjects = catalog.subjects().len(),
        questions = catalog.len(),
        failed_sources = errors.len(),
        "catalog loaded"
    );

    LoadedCatalog { catalog, errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbank_core::model::{Difficulty, Marks, Question, QuestionType, Subject};
    use storage::catalog_source::StaticCatalogSource;

    fn question(id: &str, subject: &str) -> Question {
        Question::new(
            id,
            subject,
            Marks::Five,
            Difficulty::Easy,
            QuestionType::Definition,
            format!("Define {id}."),
        )
    }

    #[tokio::test]
    async fn loads_sets_in_subject_order() {
        let source = StaticCatalogSource::new()
            .with_subjects(vec![Subject::new("b", "B"), Subject::new("a", "A")])
            .with_question_set("a", vec![question("a1", "a")])
            .with_question_set("b", vec![question("b1", "b")]);

        let loaded = load_catalog(&source).await;
        assert!(!loaded.is_degraded());
        let ids: Vec<&str> = loaded
            .catalog
            .questions()
            .iter()
            .map(|q| q.id().as_str())
            .collect();
        assert_eq!(ids, ["b1", "a1"]);
    }

    #[tokio::test]
    async fn one_failed_set_keeps_the_rest() {
        let source = StaticCatalogSource::new()
            .with_subjects(vec![Subject::new("a", "A"), Subject::new("b", "B")])
            .with_question_set("a", vec![question("a1", "a")])
            .with_failed_question_set(
                "b",
                DataLoadError::Malformed {
                    name: "questions/b.json".into(),
                    reason: "expected value".into(),
                },
            );

        let loaded = load_catalog(&source).await;
        assert!(loaded.is_degraded());
        assert_eq!(loaded.errors.len(), 1);
        assert_eq!(loaded.catalog.len(), 1);
        assert_eq!(loaded.catalog.subjects().len(), 2);
    }

    #[tokio::test]
    async fn missing_subjects_fall_back_to_discovered_sets() {
        let source = StaticCatalogSource::new()
            .with_failed_subjects(DataLoadError::Missing {
                name: "subjects.json".into(),
            })
            .with_question_set("crimes", vec![question("c1", "crimes")]);

        let loaded = load_catalog(&source).await;
        assert_eq!(loaded.errors.len(), 1);
        assert!(loaded.catalog.subjects().is_empty());
        assert!(loaded.catalog.find_question("c1").is_some());
    }

    #[tokio::test]
    async fn duplicate_ids_across_sets_keep_the_first() {
        let source = StaticCatalogSource::new()
            .with_subjects(vec![Subject::new("a", "A"), Subject::new("b", "B")])
            .with_question_set("a", vec![question("dup", "a")])
            .with_question_set("b", vec![question("dup", "b")]);

        let loaded = load_catalog(&source).await;
        assert_eq!(loaded.catalog.len(), 1);
        let kept = loaded.catalog.find_question("dup").unwrap();
        assert_eq!(kept.subject().as_str(), "a");
    }
}
