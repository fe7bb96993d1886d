use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use tracing::instrument;

use crate::{
    entities::{
        experience::{
            ExperienceListQuery, ModerationRequest, MyExperienceQuery, NewExperienceRequest, UpdateExperienceRequest,
        },
        pagination::PageQuery,
    },
    errors::AppError,
    use_cases::extractors::{AdminUser, AuthUser, MaybeClaims},
    AppState,
};

#[instrument(skip(viewer, state, query))]
pub async fn list_experiences(
    viewer: MaybeClaims,
    state: web::Data<AppState>,
    query: web::Query<ExperienceListQuery>,
) -> Result<impl Responder, AppError> {
    let identity = viewer.identity();
    let (experiences, pagination) = state
        .experience_handler
        .list_public(&query, identity.as_ref())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "experiences": experiences,
        "pagination": pagination,
    })))
}

#[instrument(skip(user, state, query))]
pub async fn my_experiences(
    user: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<MyExperienceQuery>,
) -> Result<impl Responder, AppError> {
    let (experiences, pagination) = state
        .experience_handler
        .my_experiences(&user.identity(), &query)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "experiences": experiences,
        "pagination": pagination,
    })))
}

#[instrument(skip(_admin, state, query))]
pub async fn pending_experiences(
    _admin: AdminUser,
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, AppError> {
    let (experiences, pagination) = state.experience_handler.pending(&query).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "experiences": experiences,
        "pagination": pagination,
    })))
}

#[instrument(skip(user, state, data))]
pub async fn create_experience(
    user: AuthUser,
    state: web::Data<AppState>,
    data: web::Json<NewExperienceRequest>,
) -> Result<impl Responder, AppError> {
    let experience = state
        .experience_handler
        .create_experience(&user.identity(), data.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Placement experience submitted successfully and is pending review",
        "experience": experience,
    })))
}

#[instrument(skip(viewer, state))]
pub async fn get_experience(
    viewer: MaybeClaims,
    experience_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let identity = viewer.identity();
    let experience = state
        .experience_handler
        .get_experience(&experience_id, identity.as_ref())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "experience": experience,
    })))
}

#[instrument(skip(admin, state, data))]
pub async fn moderate_experience(
    admin: AdminUser,
    experience_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<ModerationRequest>,
) -> Result<impl Responder, AppError> {
    let experience = state
        .experience_handler
        .moderate(&admin.identity(), &experience_id, data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Placement experience status updated successfully",
        "experience": experience,
    })))
}

#[instrument(skip(user, state, data))]
pub async fn update_experience(
    user: AuthUser,
    experience_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateExperienceRequest>,
) -> Result<impl Responder, AppError> {
    let experience = state
        .experience_handler
        .update_experience(&user.identity(), &experience_id, data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Placement experience updated successfully",
        "experience": experience,
    })))
}

#[instrument(skip(user, state))]
pub async fn delete_experience(
    user: AuthUser,
    experience_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state
        .experience_handler
        .delete_experience(&user.identity(), &experience_id)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Placement experience deleted successfully",
    })))
}

#[instrument(skip(_user, state))]
pub async fn vote_helpful(
    _user: AuthUser,
    experience_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let experience = state.experience_handler.vote_helpful(&experience_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Vote recorded successfully",
        "helpfulVotes": experience.helpful_votes,
    })))
}
