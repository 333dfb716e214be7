use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::ids::{SemesterId, SubjectId};

/// A subject within the active semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    id: SubjectId,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    short_name: Option<String>,
    #[serde(default)]
    color: String,
    /// Declared count; checked against the loaded questions only at load time.
    #[serde(default)]
    question_count: u32,
}

impl Subject {
    #[must_use]
    pub fn new(id: impl Into<SubjectId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            short_name: None,
            color: String::new(),
            question_count: 0,
        }
    }

    #[must_use]
    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = Some(short_name.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    #[must_use]
    pub fn with_question_count(mut self, count: u32) -> Self {
        self.question_count = count;
        self
    }

    #[must_use]
    pub fn id(&self) -> &SubjectId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn short_name(&self) -> Option<&str> {
        self.short_name.as_deref()
    }

    /// Short name when present, full name otherwise.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.short_name.as_deref().unwrap_or(&self.name)
    }

    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemesterStatus {
    Active,
    ComingSoon,
    Planned,
}

impl SemesterStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SemesterStatus::Active => "Active",
            SemesterStatus::ComingSoon => "Coming Soon",
            SemesterStatus::Planned => "Planned",
        }
    }
}

/// A semester on the roadmap. Only one is expected to be active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Semester {
    id: SemesterId,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(default)]
    active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<SemesterStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    launch_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl Semester {
    #[must_use]
    pub fn new(id: impl Into<SemesterId>, name: impl Into<String>, active: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            display_name: None,
            active,
            status: None,
            launch_date: None,
            description: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: SemesterStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_launch_date(mut self, launch_date: impl Into<String>) -> Self {
        self.launch_date = Some(launch_date.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> &SemesterId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Declared status; semesters without one are derived from the active flag.
    #[must_use]
    pub fn status(&self) -> SemesterStatus {
        match (self.status, self.active) {
            (Some(status), _) => status,
            (None, true) => SemesterStatus::Active,
            (None, false) => SemesterStatus::Planned,
        }
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Launch date, when present and in `YYYY-MM-DD` form.
    #[must_use]
    pub fn launch_date(&self) -> Option<NaiveDate> {
        self.launch_date
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
    }

    /// Launch month such as `Jun 2025`, or the raw value if it does not parse.
    #[must_use]
    pub fn launch_label(&self) -> Option<String> {
        match self.launch_date() {
            Some(date) => Some(date.format("%b %Y").to_string()),
            None => self.launch_date.clone(),
        }
    }
}
