use actix_web::{get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use tracing::instrument;

use crate::{
    entities::{
        token::RefreshTokenRequest,
        user::{ChangePasswordRequest, LoginUser, NewUser, PublicUser, UpdateProfileRequest},
    },
    errors::AppError,
    use_cases::extractors::AuthUser,
    AppState,
};

#[post("/register")]
#[instrument(skip(state, user))]
pub async fn register(
    state: web::Data<AppState>,
    user: web::Json<NewUser>,
) -> Result<impl Responder, AppError> {
    let session = state.auth_handler.register(user.into_inner()).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "User registered successfully",
        "token": session.tokens.token,
        "refreshToken": session.tokens.refresh_token,
        "user": session.user,
    })))
}

#[post("/login")]
#[instrument(skip(state, user))]
pub async fn login(
    state: web::Data<AppState>,
    user: web::Json<LoginUser>,
) -> Result<impl Responder, AppError> {
    let session = state.auth_handler.login(user.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Login successful",
        "token": session.tokens.token,
        "refreshToken": session.tokens.refresh_token,
        "user": session.user,
    })))
}

#[post("/refresh")]
#[instrument(skip(state, request))]
pub async fn refresh_token(
    state: web::Data<AppState>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<impl Responder, AppError> {
    let tokens = state.auth_handler.refresh_token(request.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "token": tokens.token,
        "refreshToken": tokens.refresh_token,
    })))
}

#[get("/profile")]
#[instrument(skip(user))]
pub async fn profile(user: AuthUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "user": PublicUser::from(user.0),
    })))
}

#[put("/profile")]
#[instrument(skip(user, state, data))]
pub async fn update_profile(
    user: AuthUser,
    state: web::Data<AppState>,
    data: web::Json<UpdateProfileRequest>,
) -> Result<impl Responder, AppError> {
    let updated = state.auth_handler.update_profile(&user.0, data.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "user": updated,
    })))
}

#[put("/change-password")]
#[instrument(skip(user, state, data))]
pub async fn change_password(
    user: AuthUser,
    state: web::Data<AppState>,
    data: web::Json<ChangePasswordRequest>,
) -> Result<impl Responder, AppError> {
    state.auth_handler.change_password(&user.0, data.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Password changed successfully",
    })))
}
