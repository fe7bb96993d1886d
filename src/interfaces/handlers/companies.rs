use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use tracing::instrument;

use crate::{
    entities::company::{CompanyListQuery, NewCompanyRequest, UpdateCompanyRequest},
    errors::AppError,
    use_cases::extractors::{AdminUser, MaybeClaims},
    AppState,
};

#[instrument(skip(state, query))]
pub async fn list_companies(
    state: web::Data<AppState>,
    query: web::Query<CompanyListQuery>,
) -> Result<impl Responder, AppError> {
    let (companies, pagination) = state.company_handler.list_companies(&query).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "companies": companies,
        "pagination": pagination,
    })))
}

#[instrument(skip(viewer, state))]
pub async fn get_company(
    viewer: MaybeClaims,
    company_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let identity = viewer.identity();
    let company = state
        .company_handler
        .get_company(&company_id, identity.as_ref())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "company": company,
    })))
}

#[instrument(skip(viewer, state))]
pub async fn company_stats(
    viewer: MaybeClaims,
    company_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let identity = viewer.identity();
    let stats = state
        .company_handler
        .company_stats(&company_id, identity.as_ref())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "stats": stats,
    })))
}

#[instrument(skip(_admin, state, data))]
pub async fn create_company(
    _admin: AdminUser,
    state: web::Data<AppState>,
    data: web::Json<NewCompanyRequest>,
) -> Result<impl Responder, AppError> {
    let company = state.company_handler.create_company(data.into_inner()).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Company created successfully",
        "company": company,
    })))
}

#[instrument(skip(_admin, state, data))]
pub async fn update_company(
    _admin: AdminUser,
    company_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateCompanyRequest>,
) -> Result<impl Responder, AppError> {
    let company = state
        .company_handler
        .update_company(&company_id, data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Company updated successfully",
        "company": company,
    })))
}

#[instrument(skip(_admin, state))]
pub async fn delete_company(
    _admin: AdminUser,
    company_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.company_handler.delete_company(&company_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Company deleted successfully",
    })))
}
