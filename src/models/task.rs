use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

pub const TITLE_MANDATORY: &str = "Title is mandatory";
pub const TITLE_TOO_LONG: &str = "Title must be at most 100 characters long";

/// Naive layouts accepted for `datetime`, interpreted as UTC.
const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// The title of the task, at most 100 characters.
    pub title: String,
    /// An optional description for the task.
    pub description: Option<String>,
    /// Whether the task is completed.
    pub done: bool,
    /// When the task is due.
    pub datetime: DateTime<Utc>,
    /// Owner of the task. Never exposed to clients.
    #[serde(skip)]
    pub user_id: i32,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update to the task.
    pub updated_at: DateTime<Utc>,
}

/// A task ready to be inserted, with every default already applied.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub done: bool,
    pub datetime: DateTime<Utc>,
    pub user_id: i32,
}

/// Fields to overwrite on an existing task. `None` leaves the column untouched.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub done: Option<bool>,
    pub datetime: Option<DateTime<Utc>>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.done.is_none()
            && self.datetime.is_none()
    }

    /// Applies the changes to an in-memory task.
    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = Some(description);
        }
        if let Some(done) = self.done {
            task.done = done;
        }
        if let Some(datetime) = self.datetime {
            task.datetime = datetime;
        }
    }
}

/// Request body for creating or patching a task.
///
/// Every field is optional at the wire level; `null` and absent are treated alike.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TaskInput {
    #[validate(length(max = 100))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub done: Option<bool>,
    /// Due date as sent by the client. Parsed by [`parse_datetime`].
    pub datetime: Option<String>,
}

impl TaskInput {
    /// Validates a creation request and fills in defaults: `datetime` is `now` and
    /// `done` is `false` when omitted.
    pub fn into_new_task(self, user_id: i32, now: DateTime<Utc>) -> Result<NewTask, AppError> {
        let title = match self.title.as_deref() {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => return Err(AppError::BadRequest(TITLE_MANDATORY.into())),
        };
        self.check_title_length()?;
        let datetime = parse_optional_datetime(self.datetime.as_deref())?.unwrap_or(now);

        Ok(NewTask {
            title,
            description: self.description,
            done: self.done.unwrap_or(false),
            datetime,
            user_id,
        })
    }

    /// Validates a patch request. Nothing is defaulted.
    pub fn into_changes(self) -> Result<TaskChanges, AppError> {
        if matches!(self.title.as_deref(), Some("")) {
            return Err(AppError::BadRequest(TITLE_MANDATORY.into()));
        }
        self.check_title_length()?;
        let datetime = parse_optional_datetime(self.datetime.as_deref())?;

        Ok(TaskChanges {
            title: self.title,
            description: self.description,
            done: self.done,
            datetime,
        })
    }

    fn check_title_length(&self) -> Result<(), AppError> {
        self.validate()
            .map_err(|_| AppError::ValidationError(TITLE_TOO_LONG.into()))
    }
}

/// An empty string counts as "not supplied".
fn parse_optional_datetime(value: Option<&str>) -> Result<Option<DateTime<Utc>>, AppError> {
    match value {
        Some(literal) if !literal.is_empty() => parse_datetime(literal).map(Some),
        _ => Ok(None),
    }
}

/// Parses an ISO-8601 style datetime.
///
/// Accepts RFC 3339 with an offset, a naive date-time (read as UTC) or a bare date
/// (UTC midnight).
pub fn parse_datetime(literal: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(literal) {
        return Ok(datetime.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(literal, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Some(naive) = NaiveDate::parse_from_str(literal, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    Err(AppError::BadRequest(format!(
        "\"{}\" is not a valid ISO datetime",
        literal
    )))
}
