use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use tracing::instrument;

use crate::{
    entities::job::{JobListQuery, NewJobRequest, UpdateJobRequest},
    errors::AppError,
    use_cases::extractors::{AdminUser, MaybeClaims},
    AppState,
};

#[instrument(skip(state, query))]
pub async fn list_jobs(
    state: web::Data<AppState>,
    query: web::Query<JobListQuery>,
) -> Result<impl Responder, AppError> {
    let (jobs, pagination) = state.job_handler.list_jobs(&query).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "jobs": jobs,
        "pagination": pagination,
    })))
}

#[instrument(skip(viewer, state))]
pub async fn get_job(
    viewer: MaybeClaims,
    job_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let identity = viewer.identity();
    let job = state.job_handler.get_job(&job_id, identity.as_ref()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "job": job,
    })))
}

#[instrument(skip(_admin, state, data))]
pub async fn create_job(
    _admin: AdminUser,
    state: web::Data<AppState>,
    data: web::Json<NewJobRequest>,
) -> Result<impl Responder, AppError> {
    let job = state.job_handler.create_job(data.into_inner()).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Job created successfully",
        "job": job,
    })))
}

#[instrument(skip(_admin, state, data))]
pub async fn update_job(
    _admin: AdminUser,
    job_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateJobRequest>,
) -> Result<impl Responder, AppError> {
    let job = state.job_handler.update_job(&job_id, data.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Job updated successfully",
        "job": job,
    })))
}

#[instrument(skip(_admin, state))]
pub async fn delete_job(
    _admin: AdminUser,
    job_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.job_handler.delete_job(&job_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Job deleted successfully",
    })))
}
