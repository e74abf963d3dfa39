use crate::{
    auth::AuthenticatedUser, error::AppError, pagination::PageQuery, pagination::Paginated,
    state::AppState,
};
use actix_web::{get, web, HttpResponse, Responder};

use super::parse_tag_id;

pub(crate) fn tag_not_found() -> AppError {
    AppError::NotFound("Tag not found".into())
}

/// Lists tags, shared by all users, with the same pagination as tasks.
#[get("")]
pub async fn list_tags(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    query_params: web::Query<PageQuery>,
) -> Result<impl Responder, AppError> {
    let page = query_params.page()?;

    let total = state.store.count_tags().await?;
    let tags = state.store.list_tags(page).await?;

    Ok(HttpResponse::Ok().json(Paginated::new(page, total, tags)))
}

#[get("/{id}")]
pub async fn get_tag(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    tag_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let tag_id = parse_tag_id(&tag_id)?;
    let tag = state
        .store
        .find_tag(tag_id)
        .await?
        .ok_or_else(tag_not_found)?;

    Ok(HttpResponse::Ok().json(tag))
}
