use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use tracing::instrument;

use crate::{
    entities::application::{
        ApplicationListQuery, NewApplicationRequest, UpdateApplicationRequest, UpdateApplicationStatusRequest,
    },
    errors::AppError,
    use_cases::extractors::{AdminUser, AuthUser},
    AppState,
};

#[instrument(skip(user, state, query))]
pub async fn my_applications(
    user: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<ApplicationListQuery>,
) -> Result<impl Responder, AppError> {
    let (applications, pagination) = state
        .application_handler
        .my_applications(&user.identity(), &query)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "applications": applications,
        "pagination": pagination,
    })))
}

#[instrument(skip(_admin, state, query))]
pub async fn list_applications(
    _admin: AdminUser,
    state: web::Data<AppState>,
    query: web::Query<ApplicationListQuery>,
) -> Result<impl Responder, AppError> {
    let (applications, pagination) = state.application_handler.list_applications(&query).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "applications": applications,
        "pagination": pagination,
    })))
}

#[instrument(skip(user, state, data))]
pub async fn create_application(
    user: AuthUser,
    state: web::Data<AppState>,
    data: web::Json<NewApplicationRequest>,
) -> Result<impl Responder, AppError> {
    let application = state
        .application_handler
        .create_application(&user.0, data.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Application submitted successfully",
        "application": application,
    })))
}

#[instrument(skip(user, state))]
pub async fn get_application(
    user: AuthUser,
    application_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let application = state
        .application_handler
        .get_application(&user.identity(), &application_id)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "application": application,
    })))
}

#[instrument(skip(user, state, data))]
pub async fn update_application(
    user: AuthUser,
    application_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateApplicationRequest>,
) -> Result<impl Responder, AppError> {
    let application = state
        .application_handler
        .update_application(&user.identity(), &application_id, data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Application updated successfully",
        "application": application,
    })))
}

#[instrument(skip(_admin, state, data))]
pub async fn update_application_status(
    _admin: AdminUser,
    application_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateApplicationStatusRequest>,
) -> Result<impl Responder, AppError> {
    let application = state
        .application_handler
        .update_status(&application_id, data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Application status updated successfully",
        "application": application,
    })))
}

#[instrument(skip(user, state))]
pub async fn withdraw_application(
    user: AuthUser,
    application_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state
        .application_handler
        .withdraw_application(&user.identity(), &application_id)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Application withdrawn successfully",
    })))
}
