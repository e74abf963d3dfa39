use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Store;
use crate::error::AppError;
use crate::filters::TaskFilter;
use crate::models::{NewTask, NewUser, Tag, Task, TaskChanges, User};
use crate::pagination::Page;

/// In-process store with the same visible behavior as [`super::PgStore`].
///
/// Rows are kept in insertion order, which is also the listing order.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    users: Vec<User>,
    tasks: Vec<Task>,
    tags: Vec<Tag>,
    next_user_id: i32,
    next_tag_id: i32,
    task_writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags have no creation endpoint; this seeds them.
    pub async fn create_tag(&self, name: &str) -> Tag {
        let mut state = self.state.write().await;
        state.next_tag_id += 1;
        let now = Utc::now();
        let tag = Tag {
            id: state.next_tag_id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.tags.push(tag.clone());
        tag
    }

    /// Number of task inserts, updates and deletes performed so far.
    pub async fn task_writes(&self) -> usize {
        self.state.read().await.task_writes
    }
}

fn paginate<T: Clone>(rows: impl Iterator<Item = T>, page: Page) -> Vec<T> {
    rows.skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect()
}

fn visible<'a>(
    tasks: &'a [Task],
    owner: i32,
    filters: &'a [TaskFilter],
) -> impl Iterator<Item = &'a Task> + 'a {
    tasks
        .iter()
        .filter(move |task| task.user_id == owner && filters.iter().all(|f| f.matches(task)))
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(
                "duplicate key value violates unique constraint \"users_email_key\"".into(),
            ));
        }
        state.next_user_id += 1;
        let now = Utc::now();
        let created = User {
            id: state.next_user_id,
            email: user.email,
            password_hash: user.password_hash,
            display_name: user.display_name,
            created_at: now,
            updated_at: now,
        };
        state.users.push(created.clone());
        Ok(created)
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn count_tasks(&self, owner: i32, filters: &[TaskFilter]) -> Result<i64, AppError> {
        let state = self.state.read().await;
        Ok(visible(&state.tasks, owner, filters).count() as i64)
    }

    async fn list_tasks(
        &self,
        owner: i32,
        filters: &[TaskFilter],
        page: Page,
    ) -> Result<Vec<Task>, AppError> {
        let state = self.state.read().await;
        Ok(paginate(visible(&state.tasks, owner, filters).cloned(), page))
    }

    async fn find_task(&self, id: Uuid, owner: i32) -> Result<Option<Task>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .iter()
            .find(|t| t.id == id && t.user_id == owner)
            .cloned())
    }

    async fn create_task(&self, task: NewTask) -> Result<Task, AppError> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let created = Task {
            id: Uuid::new_v4(),
            title: task.title,
            description: task.description,
            done: task.done,
            datetime: task.datetime,
            user_id: task.user_id,
            created_at: now,
            updated_at: now,
        };
        state.tasks.push(created.clone());
        state.task_writes += 1;
        Ok(created)
    }

    async fn update_task(
        &self,
        id: Uuid,
        owner: i32,
        changes: TaskChanges,
    ) -> Result<Option<Task>, AppError> {
        let mut state = self.state.write().await;
        let Some(task) = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.user_id == owner)
        else {
            return Ok(None);
        };
        changes.apply(task);
        task.updated_at = Utc::now();
        let updated = task.clone();
        state.task_writes += 1;
        Ok(Some(updated))
    }

    async fn delete_task(&self, id: Uuid, owner: i32) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let before = state.tasks.len();
        state.tasks.retain(|t| !(t.id == id && t.user_id == owner));
        let removed = state.tasks.len() < before;
        if removed {
            state.task_writes += 1;
        }
        Ok(removed)
    }

    async fn count_tags(&self) -> Result<i64, AppError> {
        Ok(self.state.read().await.tags.len() as i64)
    }

    async fn list_tags(&self, page: Page) -> Result<Vec<Tag>, AppError> {
        let state = self.state.read().await;
        Ok(paginate(state.tags.iter().cloned(), page))
    }

    async fn find_tag(&self, id: i32) -> Result<Option<Tag>, AppError> {
        let state = self.state.read().await;
        Ok(state.tags.iter().find(|t| t.id == id).cloned())
    }
}
