use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use qbank_core::model::{
    Difficulty, Marks, ProgressKind, Question, QuestionDraft, QuestionId, QuestionType, Semester,
    Subject, SubjectId,
};
use qbank_core::time::{fixed_clock, fixed_now};
use qbank_core::{FilterCriteria, StatusFilter};
use services::{BrowserConfig, BrowserError, BrowserEvent, QuestionBrowser, Startup};
use storage::catalog_source::{DataLoadError, StaticCatalogSource};
use storage::repository::{InMemoryRepository, ProgressRepository, StoreKey};

fn question(id: &str, subject: &str, marks: Marks, text: &str) -> Question {
    Question::new(
        id,
        subject,
        marks,
        Difficulty::Medium,
        QuestionType::Analytical,
        text,
    )
}

fn law_source() -> StaticCatalogSource {
    StaticCatalogSource::new()
        .with_semesters(vec![Semester::new("sem3", "Semester 3", true)])
        .with_subjects(vec![
            Subject::new("const_law", "Constitutional Law").with_question_count(2),
            Subject::new("crimes", "Law of Crimes").with_question_count(1),
        ])
        .with_question_set(
            "const_law",
            vec![
                question("q1", "const_law", Marks::Fifteen, "Discuss federalism."),
                question("q3", "const_law", Marks::Ten, "Explain judicial review."),
            ],
        )
        .with_question_set(
            "crimes",
            vec![question("q2", "crimes", Marks::Five, "Define mens rea.")],
        )
}

async fn open(repo: &InMemoryRepository) -> Startup {
    QuestionBrowser::open(
        &law_source(),
        Arc::new(repo.clone()),
        BrowserConfig::default(),
        fixed_clock(),
    )
    .await
}

fn page_ids(browser: &QuestionBrowser) -> Vec<String> {
    browser
        .filtered_page()
        .items
        .iter()
        .map(|question| question.id().to_string())
        .collect()
}

#[tokio::test]
async fn subject_filter_keeps_catalog_order() {
    let repo = InMemoryRepository::new();
    let Startup {
        mut browser,
        load_errors,
    } = open(&repo).await;
    assert!(load_errors.is_empty());

    browser.set_filter(FilterCriteria::subject("const_law"));
    assert_eq!(page_ids(&browser), ["q1", "q3"]);
}

#[tokio::test]
async fn studying_one_of_three_reports_a_third() {
    let repo = InMemoryRepository::new();
    let mut browser = open(&repo).await.browser;

    assert!(browser.toggle_studied("q1").await);
    let summary = browser.progress_summary();
    assert_eq!(summary.studied, 1);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.percentage_label(), "33.3");

    let const_law = &summary.subjects[0];
    assert_eq!(const_law.subject_id, SubjectId::new("const_law"));
    assert_eq!((const_law.studied, const_law.total), (1, 2));
    assert_eq!(const_law.percentage, 50);
}

#[tokio::test]
async fn whitespace_search_shows_everything() {
    let repo = InMemoryRepository::new();
    let mut browser = open(&repo).await.browser;

    browser.set_search("rea");
    assert_eq!(page_ids(&browser), ["q2"]);
    browser.set_search("  ");
    assert_eq!(page_ids(&browser), ["q1", "q3", "q2"]);
}

#[tokio::test]
async fn paging_ignores_out_of_range_requests() {
    let questions = (1..=45)
        .map(|n| question(&format!("p{n}"), "ipr", Marks::Five, "Define a patent."))
        .collect();
    let source = StaticCatalogSource::new()
        .with_subjects(vec![Subject::new("ipr", "IPR").with_question_count(45)])
        .with_question_set("ipr", questions);
    let mut browser = QuestionBrowser::open(
        &source,
        Arc::new(InMemoryRepository::new()),
        BrowserConfig::default(),
        fixed_clock(),
    )
    .await
    .browser;

    assert_eq!(browser.filtered_page().total_pages, 3);
    assert!(!browser.go_to_page(4));
    assert_eq!(browser.filtered_page().page, 1);
    assert!(browser.go_to_page(2));
    assert!(!browser.go_to_page(0));
    assert_eq!(browser.filtered_page().page, 2);
}

#[tokio::test]
async fn empty_draft_is_rejected_without_touching_the_catalog() {
    let repo = InMemoryRepository::new();
    let mut browser = open(&repo).await.browser;

    let err = browser
        .add_question(QuestionDraft {
            subject: SubjectId::new("crimes"),
            marks: Marks::Five,
            difficulty: Difficulty::Easy,
            question_type: QuestionType::Definition,
            text: String::new(),
        })
        .unwrap_err();
    assert!(matches!(err, BrowserError::Validation(_)));
    assert_eq!(browser.catalog().len(), 3);
}

#[tokio::test]
async fn added_question_joins_results_with_generated_id() {
    let repo = InMemoryRepository::new();
    let mut browser = open(&repo).await.browser;
    browser.set_filter(FilterCriteria::subject("crimes"));

    let id = browser
        .add_question(QuestionDraft {
            subject: SubjectId::new("crimes"),
            marks: Marks::Ten,
            difficulty: Difficulty::Hard,
            question_type: QuestionType::Problem,
            text: "  Solve the problem on abetment.  ".into(),
        })
        .unwrap();

    assert_eq!(
        id.as_str(),
        format!("q_sem3_crimes_{}", fixed_now().timestamp_millis())
    );
    assert_eq!(page_ids(&browser), ["q2", id.as_str()]);
    let added = browser.catalog().find_question(id.as_str()).unwrap();
    assert_eq!(added.text(), "Solve the problem on abetment.");
    assert_eq!(added.source(), Some("Admin Added"));
    assert_eq!(added.category(), "Medium Question");
}

#[tokio::test]
async fn double_toggle_persists_original_membership() {
    let repo = InMemoryRepository::new();
    let mut browser = open(&repo).await.browser;

    assert!(browser.toggle_bookmark("q3").await);
    assert!(!browser.toggle_bookmark("q3").await);
    assert!(!browser.is_bookmarked("q3"));
    assert!(
        repo.load_ids(ProgressKind::Bookmark)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn progress_survives_reopen() {
    let repo = InMemoryRepository::new();
    {
        let mut browser = open(&repo).await.browser;
        browser.toggle_bookmark("q2").await;
        browser.toggle_studied("q1").await;
    }

    let browser = open(&repo).await.browser;
    assert!(browser.is_bookmarked("q2"));
    assert!(browser.is_studied("q1"));
    let bookmarked: Vec<_> = browser
        .bookmarked_questions()
        .iter()
        .map(|question| question.id().to_string())
        .collect();
    assert_eq!(bookmarked, ["q2"]);
}

#[tokio::test]
async fn failed_write_keeps_change_and_notifies() {
    let repo = InMemoryRepository::new();
    let mut browser = open(&repo).await.browser;
    let mut events = browser.subscribe();
    repo.set_fail_writes(true);

    assert!(browser.toggle_studied("q2").await);
    assert!(browser.is_studied("q2"));
    assert_eq!(repo.raw(StoreKey::Studied).unwrap(), None);

    assert!(matches!(
        events.try_recv().unwrap(),
        BrowserEvent::PersistenceFailed {
            kind: ProgressKind::Studied,
            ..
        }
    ));
    assert!(matches!(
        events.try_recv().unwrap(),
        BrowserEvent::StudiedChanged { studied: true, .. }
    ));
}

#[tokio::test]
async fn bookmark_toggle_refreshes_bookmarked_filter() {
    let repo = InMemoryRepository::new();
    let mut browser = open(&repo).await.browser;
    browser.set_filter(FilterCriteria {
        status: Some(StatusFilter::Bookmarked),
        ..FilterCriteria::default()
    });
    assert!(page_ids(&browser).is_empty());

    let mut events = browser.subscribe();
    browser.toggle_bookmark("q1").await;
    assert_eq!(page_ids(&browser), ["q1"]);
    assert!(matches!(
        events.try_recv().unwrap(),
        BrowserEvent::BookmarkChanged {
            bookmarked: true,
            ..
        }
    ));
    assert!(matches!(
        events.try_recv().unwrap(),
        BrowserEvent::ResultsChanged { total_count: 1, .. }
    ));
}

#[tokio::test]
async fn not_studied_filter_drops_question_once_studied() {
    let repo = InMemoryRepository::new();
    let mut browser = open(&repo).await.browser;
    browser.set_filter(FilterCriteria {
        status: Some(StatusFilter::NotStudied),
        ..FilterCriteria::default()
    });
    assert_eq!(page_ids(&browser), ["q1", "q3", "q2"]);

    browser.toggle_studied("q1").await;
    assert_eq!(page_ids(&browser), ["q3", "q2"]);
}

#[tokio::test]
async fn degraded_load_keeps_saved_progress_for_missing_sets() {
    let repo = InMemoryRepository::new();
    repo.save_ids(
        ProgressKind::Studied,
        &HashSet::from([QuestionId::new("q2"), QuestionId::new("gone")]),
    )
    .await
    .unwrap();

    let source = law_source().with_failed_question_set(
        "crimes",
        DataLoadError::Missing {
            name: "questions/crimes.json".into(),
        },
    );
    let startup = QuestionBrowser::open(
        &source,
        Arc::new(repo.clone()),
        BrowserConfig::default(),
        fixed_clock(),
    )
    .await;

    assert!(startup.is_degraded());
    assert_eq!(startup.browser.catalog().len(), 2);
    assert!(startup.browser.is_studied("q2"));
    // Only ids present in the catalog count towards progress.
    assert_eq!(startup.browser.progress_summary().studied, 0);
}

#[tokio::test]
async fn full_load_prunes_unknown_saved_ids() {
    let repo = InMemoryRepository::new();
    repo.save_ids(
        ProgressKind::Bookmark,
        &HashSet::from([QuestionId::new("q1"), QuestionId::new("gone")]),
    )
    .await
    .unwrap();

    let browser = open(&repo).await.browser;
    assert!(browser.is_bookmarked("q1"));
    assert!(!browser.is_bookmarked("gone"));
}

#[tokio::test(start_paused = true)]
async fn rapid_keystrokes_run_one_search_with_latest_text() {
    let repo = InMemoryRepository::new();
    let mut browser = open(&repo).await.browser;
    let mut events = browser.subscribe();

    for partial in ["j", "ju", "jud"] {
        browser.input_search(partial);
        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(!browser.apply_due_search());
    }
    assert_eq!(page_ids(&browser), ["q1", "q3", "q2"]);

    assert!(browser.settle_search().await);
    assert_eq!(browser.search_text(), "jud");
    assert_eq!(page_ids(&browser), ["q3"]);
    assert!(matches!(
        events.try_recv().unwrap(),
        BrowserEvent::ResultsChanged { total_count: 1, .. }
    ));
    assert!(events.try_recv().is_err());
    assert!(!browser.settle_search().await);
}

#[tokio::test(start_paused = true)]
async fn immediate_search_supersedes_pending_keystrokes() {
    let repo = InMemoryRepository::new();
    let mut browser = open(&repo).await.browser;

    browser.input_search("federal");
    browser.set_search("mens");
    tokio::time::advance(Duration::from_millis(400)).await;
    assert!(!browser.apply_due_search());
    assert_eq!(page_ids(&browser), ["q2"]);
}

#[tokio::test]
async fn preview_and_exports_cover_whole_catalog() {
    let repo = InMemoryRepository::new();
    let mut browser = open(&repo).await.browser;
    browser.set_filter(FilterCriteria::subject("crimes"));

    let preview: Vec<_> = browser
        .search_preview("e")
        .iter()
        .map(|question| question.id().to_string())
        .collect();
    assert_eq!(preview, ["q1", "q3", "q2"]);

    let csv = browser.export(services::ExportFormat::Csv).unwrap();
    assert_eq!(csv.lines().count(), 4);

    let stats = browser.stats();
    assert_eq!(stats.total_questions, 3);
    assert_eq!(
        stats.by_marks,
        vec![(Marks::Fifteen, 1), (Marks::Ten, 1), (Marks::Five, 1)]
    );
}
