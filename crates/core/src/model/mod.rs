mod ids;
mod preferences;
mod progress;
mod question;
mod subject;

pub use ids::{QuestionId, SemesterId, SubjectId};

pub use preferences::Theme;
pub use progress::{ProgressKind, ProgressSets, ProgressSummary, SubjectProgress};
pub use question::{
    ADMIN_SOURCE, Difficulty, Marks, ParseFieldError, Question, QuestionDraft, QuestionType,
    ValidatedQuestion, ValidationError,
};
pub use subject::{Semester, SemesterStatus, Subject};
