use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use tracing::instrument;

use crate::{
    entities::round::{NewAptitudeRound, NewDsaRound, NewHrRound, NewRoundRequest, NewTechRound, UpdateRoundRequest},
    errors::AppError,
    use_cases::extractors::AuthUser,
    AppState,
};

#[instrument(skip(user, state))]
pub async fn my_rounds(user: AuthUser, state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let rounds = state.round_handler.my_rounds(&user.identity()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": rounds.len(),
        "rounds": rounds,
    })))
}

#[instrument(skip(user, state, data))]
pub async fn create_round(
    user: AuthUser,
    state: web::Data<AppState>,
    data: web::Json<NewRoundRequest>,
) -> Result<impl Responder, AppError> {
    let round = state.round_handler.create_round(&user.identity(), data.into_inner()).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Round created successfully",
        "round": round,
    })))
}

#[instrument(skip(user, state))]
pub async fn get_round(
    user: AuthUser,
    round_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let round = state.round_handler.get_round(&user.identity(), &round_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "round": round,
    })))
}

#[instrument(skip(user, state, data))]
pub async fn update_round(
    user: AuthUser,
    round_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateRoundRequest>,
) -> Result<impl Responder, AppError> {
    let round = state
        .round_handler
        .update_round(&user.identity(), &round_id, data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Round updated successfully",
        "round": round,
    })))
}

#[instrument(skip(user, state))]
pub async fn delete_round(
    user: AuthUser,
    round_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.round_handler.delete_round(&user.identity(), &round_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Round deleted successfully",
    })))
}

#[instrument(skip(user, state, data))]
pub async fn add_aptitude(
    user: AuthUser,
    round_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<NewAptitudeRound>,
) -> Result<impl Responder, AppError> {
    let detail = state
        .round_handler
        .add_aptitude(&user.identity(), &round_id, data.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Aptitude round added successfully",
        "aptitudeRound": detail,
    })))
}

#[instrument(skip(user, state, data))]
pub async fn add_tech(
    user: AuthUser,
    round_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<NewTechRound>,
) -> Result<impl Responder, AppError> {
    let detail = state
        .round_handler
        .add_tech(&user.identity(), &round_id, data.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Technical round added successfully",
        "techRound": detail,
    })))
}

#[instrument(skip(user, state, data))]
pub async fn add_dsa(
    user: AuthUser,
    round_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<NewDsaRound>,
) -> Result<impl Responder, AppError> {
    let detail = state
        .round_handler
        .add_dsa(&user.identity(), &round_id, data.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "DSA round added successfully",
        "dsaRound": detail,
    })))
}

#[instrument(skip(user, state, data))]
pub async fn add_hr(
    user: AuthUser,
    round_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<NewHrRound>,
) -> Result<impl Responder, AppError> {
    let detail = state
        .round_handler
        .add_hr(&user.identity(), &round_id, data.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "HR round added successfully",
        "hrRound": detail,
    })))
}
