use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    filters::TaskListQuery,
    models::TaskInput,
    pagination::Paginated,
    state::AppState,
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use chrono::Utc;

use super::parse_task_id;

pub(crate) fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

/// Retrieves one page of the authenticated user's tasks.
///
/// ## Query Parameters:
/// - `page` (optional, default 1) and `limit` (optional, 1 to 250, default 5).
/// - `title` (optional): case-insensitive substring of the title.
/// - `done` (optional): `true` or `false`.
/// - `late` (optional): `true` keeps tasks due before now, `false` the others.
///
/// ## Responses:
/// - `200 OK`: `{ total, hasNext, hasPrev, results }`.
/// - `400 Bad Request`: invalid pagination or filter value.
/// - `403 Forbidden`: missing or invalid token.
#[get("")]
pub async fn list_tasks(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query_params: web::Query<TaskListQuery>,
) -> Result<impl Responder, AppError> {
    let page = query_params.page()?;
    let filters = query_params.filters(Utc::now())?;

    let total = state.store.count_tasks(user.id(), &filters).await?;
    let tasks = state.store.list_tasks(user.id(), &filters, page).await?;

    Ok(HttpResponse::Ok().json(Paginated::new(page, total, tasks)))
}

/// Retrieves one of the authenticated user's tasks.
///
/// ## Responses:
/// - `200 OK`: the task.
/// - `404 Not Found`: no such task, or it belongs to someone else.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let task_id = parse_task_id(&task_id)?;
    let task = state
        .store
        .find_task(task_id, user.id())
        .await?
        .ok_or_else(task_not_found)?;

    Ok(HttpResponse::Ok().json(task))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Request Body:
/// - `title` (required, at most 100 characters).
/// - `description` (optional).
/// - `done` (optional, default `false`).
/// - `datetime` (optional ISO datetime, default now).
///
/// ## Responses:
/// - `201 Created`: the new task.
/// - `400 Bad Request`: missing title, title too long or unparsable datetime.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let new_task = task_data.into_inner().into_new_task(user.id(), Utc::now())?;
    let task = state.store.create_task(new_task).await?;

    Ok(HttpResponse::Created().json(task))
}

/// Updates the supplied fields of a task.
///
/// Absent and `null` fields are left as they are. A body with no fields writes
/// nothing and returns the task unchanged. Ownership is checked before the body,
/// so another user's task is a 404 even when the body is malformed.
///
/// ## Responses:
/// - `200 OK`: the task after the update.
/// - `400 Bad Request`: malformed body, invalid title or datetime.
/// - `404 Not Found`: no such task, or it belongs to someone else.
#[patch("/{id}")]
pub async fn patch_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<String>,
    task_data: Result<web::Json<TaskInput>, actix_web::Error>,
) -> Result<HttpResponse, actix_web::Error> {
    let task_id = parse_task_id(&task_id)?;
    let task = state
        .store
        .find_task(task_id, user.id())
        .await?
        .ok_or_else(task_not_found)?;

    let changes = task_data?.into_inner().into_changes()?;
    if changes.is_empty() {
        return Ok(HttpResponse::Ok().json(task));
    }

    // The task may have been deleted since the lookup above.
    let updated = state
        .store
        .update_task(task_id, user.id(), changes)
        .await?
        .ok_or_else(task_not_found)?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes a task permanently.
///
/// ## Responses:
/// - `204 No Content`: the task is gone.
/// - `404 Not Found`: no such task, or it belongs to someone else.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let task_id = parse_task_id(&task_id)?;
    if !state.store.delete_task(task_id, user.id()).await? {
        return Err(task_not_found());
    }

    Ok(HttpResponse::NoContent().finish())
}
