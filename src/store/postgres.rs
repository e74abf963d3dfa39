use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::Store;
use crate::error::AppError;
use crate::filters::TaskFilter;
use crate::models::{NewTask, NewUser, Tag, Task, TaskChanges, User};
use crate::pagination::Page;

const USER_COLUMNS: &str = "id, email, password_hash, display_name, created_at, updated_at";
const TASK_COLUMNS: &str =
    "id, title, description, done, datetime, user_id, created_at, updated_at";
const TAG_COLUMNS: &str = "id, name, created_at, updated_at";

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations under `migrations/`.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// `WHERE user_id = $1 AND <filter>...`
fn push_task_predicates(builder: &mut QueryBuilder<'_, Postgres>, owner: i32, filters: &[TaskFilter]) {
    builder.push(" WHERE user_id = ").push_bind(owner);
    for filter in filters {
        filter.push_predicate(builder);
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, display_name) VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.display_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn count_tasks(&self, owner: i32, filters: &[TaskFilter]) -> Result<i64, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tasks");
        push_task_predicates(&mut builder, owner, filters);
        let total = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn list_tasks(
        &self,
        owner: i32,
        filters: &[TaskFilter],
        page: Page,
    ) -> Result<Vec<Task>, AppError> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {TASK_COLUMNS} FROM tasks"));
        push_task_predicates(&mut builder, owner, filters);
        builder
            .push(" ORDER BY created_at, id LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let tasks = builder
            .build_query_as::<Task>()
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn find_task(&self, id: Uuid, owner: i32) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn create_task(&self, task: NewTask) -> Result<Task, AppError> {
        let created = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (id, title, description, done, datetime, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(task.title)
        .bind(task.description)
        .bind(task.done)
        .bind(task.datetime)
        .bind(task.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_task(
        &self,
        id: Uuid,
        owner: i32,
        changes: TaskChanges,
    ) -> Result<Option<Task>, AppError> {
        let updated = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET \
                 title = COALESCE($1, title), \
                 description = COALESCE($2, description), \
                 done = COALESCE($3, done), \
                 datetime = COALESCE($4, datetime), \
                 updated_at = NOW() \
             WHERE id = $5 AND user_id = $6 \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.done)
        .bind(changes.datetime)
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_task(&self, id: Uuid, owner: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_tags(&self) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tags")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn list_tags(&self, page: Page) -> Result<Vec<Tag>, AppError> {
        let tags = sqlx::query_as::<_, Tag>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    async fn find_tag(&self, id: i32) -> Result<Option<Tag>, AppError> {
        let tag = sqlx::query_as::<_, Tag>(&format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    // Needs a disposable PostgreSQL database in DATABASE_URL.
    #[ignore]
    #[actix_rt::test]
    async fn test_postgres_round_trip() {
        dotenv::dotenv().ok();
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
        let store = PgStore::connect(&url, 2).await.unwrap();
        store.migrate().await.unwrap();

        let email = format!("{}@example.com", Uuid::new_v4());
        let user = store
            .create_user(NewUser {
                email: email.clone(),
                password_hash: "hash".into(),
                display_name: "Round Trip".into(),
            })
            .await
            .unwrap();
        let duplicate = store
            .create_user(NewUser {
                email: email.clone(),
                password_hash: "hash".into(),
                display_name: "Again".into(),
            })
            .await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));

        let task = store
            .create_task(NewTask {
                title: "100% done_ish".into(),
                description: None,
                done: false,
                datetime: Utc::now(),
                user_id: user.id,
            })
            .await
            .unwrap();

        let filters = [TaskFilter::TitleContains("100%".into())];
        assert_eq!(store.count_tasks(user.id, &filters).await.unwrap(), 1);
        let page = Page { page: 1, limit: 5 };
        assert_eq!(store.list_tasks(user.id, &filters, page).await.unwrap().len(), 1);
        let wildcard = [TaskFilter::TitleContains("%".into())];
        assert_eq!(store.count_tasks(user.id, &wildcard).await.unwrap(), 1);
        let no_match = [TaskFilter::TitleContains("0_ %".into())];
        assert_eq!(store.count_tasks(user.id, &no_match).await.unwrap(), 0);

        let changes = TaskChanges {
            done: Some(true),
            ..TaskChanges::default()
        };
        let updated = store.update_task(task.id, user.id, changes).await.unwrap().unwrap();
        assert!(updated.done);
        assert_eq!(updated.title, task.title);

        assert!(store.delete_task(task.id, user.id).await.unwrap());
        assert!(!store.delete_task(task.id, user.id).await.unwrap());

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user.id)
            .execute(store.pool())
            .await
            .unwrap();
    }
}
