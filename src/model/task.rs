//! Tasks: titled records with a workflow status and last-modified tracking.

use super::{Patch, Resource};
use crate::error::AppError;
use crate::service::validation::{check_length, check_optional_length};
use crate::service::ValidationErrors;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const TITLE_MAX: usize = 200;
const DESCRIPTION_MAX: usize = 1000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];
    pub const NAMES: &'static [&'static str] = &["pending", "in_progress", "completed"];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// Parse a wire value; `subject` names the rejected input in the error.
    pub fn parse(s: &str, subject: &'static str) -> Result<Self, AppError> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::InvalidEnumValue {
                subject,
                value: s.to_string(),
                allowed: TaskStatus::NAMES,
            })
    }
}

impl FromStr for TaskStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::parse(s, "status")
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Patch<String>,
    pub description: Patch<Option<String>>,
    pub status: Patch<TaskStatus>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskFilter {
    Status(TaskStatus),
}

/// Task creation payload as received.
#[derive(Clone, Debug, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Task update payload as received. `status` stays a plain string until
/// validated so an unknown value is reported as an enum error, not a shape
/// error.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TaskChanges {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub description: Patch<Option<String>>,
    #[serde(default)]
    pub status: Patch<String>,
}

impl TaskDraft {
    pub fn validate(self) -> Result<NewTask, AppError> {
        let mut errors = ValidationErrors::new();
        check_length(&mut errors, "title", &self.title, 1, TITLE_MAX);
        let description = self.description.as_deref();
        check_optional_length(&mut errors, "description", description, DESCRIPTION_MAX);
        errors.finish(NewTask {
            title: self.title,
            description: self.description,
        })
    }
}

impl TaskChanges {
    /// Shape rules are checked first; a bad status is reported only once the
    /// rest of the payload is acceptable.
    pub fn validate(self) -> Result<TaskPatch, AppError> {
        let mut errors = ValidationErrors::new();
        if let Patch::Set(title) = &self.title {
            check_length(&mut errors, "title", title, 1, TITLE_MAX);
        }
        if let Patch::Set(description) = &self.description {
            let description = description.as_deref();
            check_optional_length(&mut errors, "description", description, DESCRIPTION_MAX);
        }
        let (title, description) = errors.finish((self.title, self.description))?;
        let status = match self.status {
            Patch::Unset => Patch::Unset,
            Patch::Set(raw) => Patch::Set(raw.parse::<TaskStatus>()?),
        };
        Ok(TaskPatch {
            title,
            description,
            status,
        })
    }
}

/// Turn an optional `status_filter` query value into a list filter. An empty
/// value means no filter.
pub fn parse_status_filter(raw: Option<&str>) -> Result<Option<TaskFilter>, AppError> {
    match raw {
        None | Some("") => Ok(None),
        Some(s) => {
            let status = TaskStatus::parse(s, "status filter")?;
            Ok(Some(TaskFilter::Status(status)))
        }
    }
}

impl Resource for Task {
    const KIND: &'static str = "Task";
    const DEFAULT_LIMIT: Option<usize> = None;

    type Create = NewTask;
    type Patch = TaskPatch;
    type Filter = TaskFilter;

    fn id(&self) -> i64 {
        self.id
    }

    fn build(id: i64, fields: NewTask, now: DateTime<Utc>) -> Self {
        Task {
            id,
            title: fields.title,
            description: fields.description,
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// `updated_at` always moves forward, by at least one microsecond, even
    /// when the clock has not advanced since the previous write.
    fn apply_patch(&mut self, patch: TaskPatch, now: DateTime<Utc>) {
        patch.title.apply_to(&mut self.title);
        patch.description.apply_to(&mut self.description);
        patch.status.apply_to(&mut self.status);
        self.updated_at = now.max(self.updated_at + Duration::microseconds(1));
    }

    fn matches(&self, filter: &TaskFilter) -> bool {
        match filter {
            TaskFilter::Status(status) => self.status == *status,
        }
    }
}
