//! Task list filters.
//!
//! A list request is scoped to its caller and then narrowed by the optional `title`,
//! `done` and `late` query parameters, always applied in that order. Each filter
//! compiles to a SQL predicate for [`crate::store::PgStore`] and to a plain predicate
//! for [`crate::store::MemoryStore`]; both must agree.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

use crate::error::AppError;
use crate::models::Task;
use crate::pagination::{Page, PageQuery};

const BOOLEAN_CHOICES: [&str; 2] = ["true", "false"];

/// Query string of `GET /tasks`.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    #[serde(flatten)]
    pub pagination: PageQuery,
    pub title: Option<String>,
    pub done: Option<String>,
    pub late: Option<String>,
}

impl TaskListQuery {
    pub fn page(&self) -> Result<Page, AppError> {
        self.pagination.page()
    }

    /// Builds the filters in declaration order. `now` is the reference for `late`.
    pub fn filters(&self, now: DateTime<Utc>) -> Result<Vec<TaskFilter>, AppError> {
        let mut filters = Vec::new();
        if let Some(title) = &self.title {
            filters.push(TaskFilter::TitleContains(title.clone()));
        }
        if let Some(done) = &self.done {
            filters.push(TaskFilter::DoneEquals(parse_boolean_choice("done", done)?));
        }
        if let Some(late) = &self.late {
            filters.push(TaskFilter::OverdueBefore {
                now,
                overdue: parse_boolean_choice("late", late)?,
            });
        }
        Ok(filters)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskFilter {
    /// Case-insensitive substring match on the title.
    TitleContains(String),
    DoneEquals(bool),
    /// `overdue == true` keeps tasks due strictly before `now`; `false` keeps the rest.
    OverdueBefore { now: DateTime<Utc>, overdue: bool },
}

impl TaskFilter {
    /// Appends ` AND <predicate>` with its bound parameter.
    pub fn push_predicate(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        match self {
            TaskFilter::TitleContains(needle) => {
                builder
                    .push(" AND title ILIKE ")
                    .push_bind(format!("%{}%", escape_like(needle)))
                    .push(r" ESCAPE '\'");
            }
            TaskFilter::DoneEquals(done) => {
                builder.push(" AND done = ").push_bind(*done);
            }
            TaskFilter::OverdueBefore { now, overdue } => {
                let operator = if *overdue { " < " } else { " >= " };
                builder.push(" AND datetime").push(operator).push_bind(*now);
            }
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::TitleContains(needle) => task
                .title
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            TaskFilter::DoneEquals(done) => task.done == *done,
            TaskFilter::OverdueBefore { now, overdue } => (task.datetime < *now) == *overdue,
        }
    }
}

fn parse_boolean_choice(name: &str, value: &str) -> Result<bool, AppError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(AppError::BadRequest(format!(
            "Value for {} must be one of: {}",
            name,
            BOOLEAN_CHOICES.join(", ")
        ))),
    }
}

/// Escapes `LIKE` wildcards so user input only ever matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn task(title: &str, done: bool, datetime: DateTime<Utc>) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            done,
            datetime,
            user_id: 1,
            created_at: datetime,
            updated_at: datetime,
        }
    }

    fn query(title: Option<&str>, done: Option<&str>, late: Option<&str>) -> TaskListQuery {
        TaskListQuery {
            pagination: PageQuery::default(),
            title: title.map(str::to_string),
            done: done.map(str::to_string),
            late: late.map(str::to_string),
        }
    }

    #[test]
    fn test_filters_follow_declaration_order() {
        let now = Utc::now();
        let filters = query(Some("report"), Some("false"), Some("true"))
            .filters(now)
            .unwrap();
        assert_eq!(
            filters,
            vec![
                TaskFilter::TitleContains("report".into()),
                TaskFilter::DoneEquals(false),
                TaskFilter::OverdueBefore { now, overdue: true },
            ]
        );
        assert!(query(None, None, None).filters(now).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_choice_names_filter_and_choices() {
        match query(None, Some("yes"), None).filters(Utc::now()) {
            Err(AppError::BadRequest(msg)) => {
                assert_eq!(msg, "Value for done must be one of: true, false")
            }
            other => panic!("expected a filter error, got {:?}", other),
        }
        match query(None, None, Some("1")).filters(Utc::now()) {
            Err(AppError::BadRequest(msg)) => assert!(msg.starts_with("Value for late")),
            other => panic!("expected a filter error, got {:?}", other),
        }
    }

    #[test]
    fn test_in_memory_predicates() {
        let now = Utc::now();
        let past = task("Pay Rent", false, now - Duration::days(1));
        let future = task("Book flights", true, now + Duration::days(1));

        let title = TaskFilter::TitleContains("rent".into());
        assert!(title.matches(&past));
        assert!(!title.matches(&future));

        assert!(TaskFilter::DoneEquals(true).matches(&future));
        assert!(!TaskFilter::DoneEquals(true).matches(&past));

        let late = TaskFilter::OverdueBefore { now, overdue: true };
        let on_time = TaskFilter::OverdueBefore { now, overdue: false };
        assert!(late.matches(&past));
        assert!(!late.matches(&future));
        assert!(on_time.matches(&future));
        assert!(on_time.matches(&task("Due right now", false, now)));
    }

    #[test]
    fn test_sql_predicates() {
        let now = Utc::now();
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM tasks WHERE user_id = ");
        builder.push_bind(1_i32);
        for filter in [
            TaskFilter::TitleContains("50%".into()),
            TaskFilter::DoneEquals(true),
            TaskFilter::OverdueBefore { now, overdue: false },
        ] {
            filter.push_predicate(&mut builder);
        }
        assert_eq!(
            builder.sql(),
            r"SELECT 1 FROM tasks WHERE user_id = $1 AND title ILIKE $2 ESCAPE '\' AND done = $3 AND datetime >= $4"
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%_off"), r"50\%\_off");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
    }
}
