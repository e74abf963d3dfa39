//! Storage access.
//!
//! Handlers only ever talk to the [`Store`] trait. [`PgStore`] is the production
//! implementation; [`MemoryStore`] keeps everything in process and backs the tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::filters::TaskFilter;
use crate::models::{NewTask, NewUser, Tag, Task, TaskChanges, User};
use crate::pagination::Page;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Every task operation takes the caller's id and only ever sees that caller's rows.
/// A task owned by someone else behaves exactly like a missing one.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fails with `AppError::Conflict` when the email is already registered.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn count_tasks(&self, owner: i32, filters: &[TaskFilter]) -> Result<i64, AppError>;

    async fn list_tasks(
        &self,
        owner: i32,
        filters: &[TaskFilter],
        page: Page,
    ) -> Result<Vec<Task>, AppError>;

    async fn find_task(&self, id: Uuid, owner: i32) -> Result<Option<Task>, AppError>;

    async fn create_task(&self, task: NewTask) -> Result<Task, AppError>;

    /// Returns `None` when no task matched.
    async fn update_task(
        &self,
        id: Uuid,
        owner: i32,
        changes: TaskChanges,
    ) -> Result<Option<Task>, AppError>;

    /// Returns whether a task was removed.
    async fn delete_task(&self, id: Uuid, owner: i32) -> Result<bool, AppError>;

    async fn count_tags(&self) -> Result<i64, AppError>;

    async fn list_tags(&self, page: Page) -> Result<Vec<Tag>, AppError>;

    async fn find_tag(&self, id: i32) -> Result<Option<Tag>, AppError>;
}
