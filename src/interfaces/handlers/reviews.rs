use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use tracing::instrument;

use crate::{
    entities::{
        pagination::PageQuery,
        review::{NewReviewRequest, ReviewListQuery, UpdateReviewRequest},
    },
    errors::AppError,
    use_cases::extractors::{AuthUser, MaybeClaims},
    AppState,
};

#[instrument(skip(viewer, state, query))]
pub async fn company_reviews(
    viewer: MaybeClaims,
    company_id: web::Path<String>,
    state: web::Data<AppState>,
    query: web::Query<ReviewListQuery>,
) -> Result<impl Responder, AppError> {
    let identity = viewer.identity();
    let (reviews, pagination) = state
        .review_handler
        .company_reviews(&company_id, &query, identity.as_ref())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "reviews": reviews,
        "pagination": pagination,
    })))
}

#[instrument(skip(user, state, query))]
pub async fn my_reviews(
    user: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, AppError> {
    let (reviews, pagination) = state.review_handler.my_reviews(&user.identity(), &query).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "reviews": reviews,
        "pagination": pagination,
    })))
}

#[instrument(skip(user, state, data))]
pub async fn create_review(
    user: AuthUser,
    state: web::Data<AppState>,
    data: web::Json<NewReviewRequest>,
) -> Result<impl Responder, AppError> {
    let review = state
        .review_handler
        .create_review(&user.identity(), data.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Review submitted successfully",
        "review": review,
    })))
}

#[instrument(skip(viewer, state))]
pub async fn get_review(
    viewer: MaybeClaims,
    review_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let identity = viewer.identity();
    let review = state.review_handler.get_review(&review_id, identity.as_ref()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "review": review,
    })))
}

#[instrument(skip(user, state, data))]
pub async fn update_review(
    user: AuthUser,
    review_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateReviewRequest>,
) -> Result<impl Responder, AppError> {
    let review = state
        .review_handler
        .update_review(&user.identity(), &review_id, data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Review updated successfully",
        "review": review,
    })))
}

#[instrument(skip(user, state))]
pub async fn delete_review(
    user: AuthUser,
    review_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.review_handler.delete_review(&user.identity(), &review_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Review deleted successfully",
    })))
}

#[instrument(skip(_user, state))]
pub async fn mark_helpful(
    _user: AuthUser,
    review_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let review = state.review_handler.mark_helpful(&review_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Review marked as helpful",
        "helpfulVotes": review.helpful_votes,
    })))
}

#[instrument(skip(_user, state))]
pub async fn report_review(
    _user: AuthUser,
    review_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.review_handler.report_review(&review_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Review reported successfully",
    })))
}
