//! Read-only static data sources for the catalog.
//!
//! The on-disk layout is a data directory holding `semesters.json`,
//! `subjects.json` and one `questions/<set>.json` per subject. Every file wraps
//! its list in a single top-level field.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use qbank_core::model::{Question, Semester, Subject};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// A static source that could not be fetched or parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DataLoadError {
    #[error("data source `{name}` is missing")]
    Missing { name: String },

    #[error("failed to read data source `{name}`: {reason}")]
    Read { name: String, reason: String },

    #[error("data source `{name}` is malformed: {reason}")]
    Malformed { name: String, reason: String },
}

impl DataLoadError {
    /// Name of the source that failed.
    #[must_use]
    pub fn source_name(&self) -> &str {
        match self {
            DataLoadError::Missing { name }
            | DataLoadError::Read { name, .. }
            | DataLoadError::Malformed { name, .. } => name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SemestersDocument {
    semesters: Vec<Semester>,
}

#[derive(Debug, Deserialize)]
struct SubjectsDocument {
    subjects: Vec<Subject>,
}

#[derive(Debug, Deserialize)]
struct QuestionsDocument {
    questions: Vec<Question>,
}

/// Provider of the catalog's static data.
///
/// Each method fetches one independent source; a failure in one says nothing
/// about the others.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// # Errors
    ///
    /// Returns `DataLoadError` if the semesters source is missing or malformed.
    async fn semesters(&self) -> Result<Vec<Semester>, DataLoadError>;

    /// # Errors
    ///
    /// Returns `DataLoadError` if the subjects source is missing or malformed.
    async fn subjects(&self) -> Result<Vec<Subject>, DataLoadError>;

    /// Question sets discoverable without the subjects list, in load order.
    ///
    /// # Errors
    ///
    /// Returns `DataLoadError` if the sets cannot be enumerated.
    async fn question_sets(&self) -> Result<Vec<String>, DataLoadError>;

    /// # Errors
    ///
    /// Returns `DataLoadError` if the question set is missing or malformed.
    async fn questions(&self, set: &str) -> Result<Vec<Question>, DataLoadError>;
}

/// Reads the static JSON files from a data directory.
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    root: PathBuf,
}

impl FileCatalogSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn questions_dir(&self) -> PathBuf {
        self.root.join("questions")
    }

    async fn read_document<T: DeserializeOwned>(&self, path: &Path) -> Result<T, DataLoadError> {
        let name = path
            .strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string();
        let raw = tokio::fs::read_to_string(path).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                DataLoadError::Missing { name: name.clone() }
            } else {
                DataLoadError::Read {
                    name: name.clone(),
                    reason: err.to_string(),
                }
            }
        })?;
        serde_json::from_str(&raw).map_err(|err| DataLoadError::Malformed {
            name,
            reason: err.to_string(),
        })
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    async fn semesters(&self) -> Result<Vec<Semester>, DataLoadError> {
        let doc: SemestersDocument = self.read_document(&self.root.join("semesters.json")).await?;
        Ok(doc.semesters)
    }

    async fn subjects(&self) -> Result<Vec<Subject>, DataLoadError> {
        let doc: SubjectsDocument = self.read_document(&self.root.join("subjects.json")).await?;
        Ok(doc.subjects)
    }

    async fn question_sets(&self) -> Result<Vec<String>, DataLoadError> {
        let dir = self.questions_dir();
        let read_err = |err: std::io::Error| DataLoadError::Read {
            name: "questions/".to_owned(),
            reason: err.to_string(),
        };
        let mut entries = tokio::fs::read_dir(&dir).await.map_err(read_err)?;
        let mut sets = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    sets.push(stem.to_owned());
                }
            }
        }
        sets.sort();
        Ok(sets)
    }

    async fn questions(&self, set: &str) -> Result<Vec<Question>, DataLoadError> {
        let path = self.questions_dir().join(format!("{set}.json"));
        let doc: QuestionsDocument = self.read_document(&path).await?;
        Ok(doc.questions)
    }
}

/// In-memory source with per-source outcomes, for tests and embedding.
#[derive(Debug, Clone)]
pub struct StaticCatalogSource {
    semesters: Result<Vec<Semester>, DataLoadError>,
    subjects: Result<Vec<Subject>, DataLoadError>,
    sets: Vec<String>,
    questions: HashMap<String, Result<Vec<Question>, DataLoadError>>,
}

impl Default for StaticCatalogSource {
    fn default() -> Self {
        Self {
            semesters: Ok(Vec::new()),
            subjects: Ok(Vec::new()),
            sets: Vec::new(),
            questions: HashMap::new(),
        }
    }
}

impl StaticCatalogSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_semesters(mut self, semesters: Vec<Semester>) -> Self {
        self.semesters = Ok(semesters);
        self
    }

    #[must_use]
    pub fn with_subjects(mut self, subjects: Vec<Subject>) -> Self {
        self.subjects = Ok(subjects);
        self
    }

    #[must_use]
    pub fn with_failed_subjects(mut self, err: DataLoadError) -> Self {
        self.subjects = Err(err);
        self
    }

    #[must_use]
    pub fn with_failed_semesters(mut self, err: DataLoadError) -> Self {
        self.semesters = Err(err);
        self
    }

    #[must_use]
    pub fn with_question_set(mut self, set: impl Into<String>, questions: Vec<Question>) -> Self {
        self.insert_set(set.into(), Ok(questions));
        self
    }

    #[must_use]
    pub fn with_failed_question_set(mut self, set: impl Into<String>, err: DataLoadError) -> Self {
        self.insert_set(set.into(), Err(err));
        self
    }

    fn insert_set(&mut self, set: String, outcome: Result<Vec<Question>, DataLoadError>) {
        if !self.sets.contains(&set) {
            self.sets.push(set.clone());
        }
        self.questions.insert(set, outcome);
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn semesters(&self) -> Result<Vec<Semester>, DataLoadError> {
        self.semesters.clone()
    }

    async fn subjects(&self) -> Result<Vec<Subject>, DataLoadError> {
        self.subjects.clone()
    }

    async fn question_sets(&self) -> Result<Vec<String>, DataLoadError> {
        Ok(self.sets.clone())
    }

    async fn questions(&self, set: &str) -> Result<Vec<Question>, DataLoadError> {
        self.questions
            .get(set)
            .cloned()
            .unwrap_or_else(|| {
                Err(DataLoadError::Missing {
                    name: format!("questions/{set}.json"),
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    #[tokio::test]
    async fn reads_wrapped_documents_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "subjects.json",
            r##"{"subjects":[{"id":"ipr","name":"IPR","color":"#000","questionCount":1}]}"##,
        );
        write(
            dir.path(),
            "questions/ipr.json",
            r#"{"questions":[{"id":"q1","subject":"ipr","marks":5,"type":"definition","difficulty":"easy","text":"Define patent."}]}"#,
        );

        let source = FileCatalogSource::new(dir.path());
        let subjects = source.subjects().await.unwrap();
        assert_eq!(subjects.len(), 1);
        let questions = source.questions("ipr").await.unwrap();
        assert_eq!(questions[0].id().as_str(), "q1");
        assert_eq!(source.question_sets().await.unwrap(), vec!["ipr".to_owned()]);
    }

    #[tokio::test]
    async fn distinguishes_missing_from_malformed() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "semesters.json", "{not json");

        let source = FileCatalogSource::new(dir.path());
        let err = source.semesters().await.unwrap_err();
        assert!(matches!(err, DataLoadError::Malformed { .. }));
        assert_eq!(err.source_name(), "semesters.json");

        let err = source.subjects().await.unwrap_err();
        assert!(matches!(err, DataLoadError::Missing { .. }));
    }

    #[tokio::test]
    async fn static_source_reports_unknown_sets_as_missing() {
        let source = StaticCatalogSource::new().with_question_set("ipr", Vec::new());
        assert!(source.questions("ipr").await.unwrap().is_empty());
        assert!(matches!(
            source.questions("crimes").await.unwrap_err(),
            DataLoadError::Missing { .. }
        ));
    }
}
