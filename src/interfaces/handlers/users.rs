use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use tracing::instrument;

use crate::{entities::user::UserListQuery, errors::AppError, use_cases::extractors::AdminUser, AppState};

#[instrument(skip(_admin, state, query))]
pub async fn list_users(
    _admin: AdminUser,
    state: web::Data<AppState>,
    query: web::Query<UserListQuery>,
) -> Result<impl Responder, AppError> {
    let (users, pagination) = state.user_handler.list_users(&query).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "users": users,
        "pagination": pagination,
    })))
}

#[instrument(skip(_admin, state))]
pub async fn get_user(
    _admin: AdminUser,
    user_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let detail = state.user_handler.get_user(&user_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "user": detail.user,
        "applications": detail.applications,
        "reviews": detail.reviews,
    })))
}
