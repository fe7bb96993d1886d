use actix_web::{dev::Payload, web, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, LocalBoxFuture, Ready};

use crate::{
    domain::policy::Identity,
    entities::{
        token::Claims,
        user::{User, UserRole},
    },
    errors::{AppError, AuthError},
    AppState,
};

fn app_state(req: &HttpRequest) -> Result<web::Data<AppState>, AppError> {
    req.app_data::<web::Data<AppState>>().cloned().ok_or_else(|| {
        tracing::error!("AppState missing in extractor");
        AppError::InternalError("Application state not configured".to_string())
    })
}

/// An authenticated, active user loaded from storage.
/// Returns 401 when the request carries no valid token or the account is gone.
/// Usage: add `user: AuthUser` as a parameter to a handler.
#[derive(Debug)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn identity(&self) -> Identity {
        self.0.identity()
    }
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        let state = app_state(req);

        Box::pin(async move {
            let claims = claims.ok_or(AuthError::MissingCredentials)?;
            let user = state?.auth_handler.current_user(&claims).await?;
            Ok(AuthUser(user))
        })
    }
}

/// An authenticated admin.
/// Returns 401 without a valid token and 403 for any other role. The role in
/// the token is checked before storage is touched, then re-checked on the
/// stored user.
#[derive(Debug)]
pub struct AdminUser(pub User);

impl AdminUser {
    pub fn identity(&self) -> Identity {
        self.0.identity()
    }
}

impl FromRequest for AdminUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        let state = app_state(req);

        Box::pin(async move {
            let claims = claims.ok_or(AuthError::MissingCredentials)?;
            if claims.role != UserRole::Admin {
                tracing::warn!(sub = %claims.sub, "Admin access denied");
                return Err(AuthError::Forbidden("Admin access required".into()).into());
            }

            let user = state?.auth_handler.current_user(&claims).await?;
            if !user.is_admin() {
                tracing::warn!(user_id = %user.id, "Token role no longer matches stored role");
                return Err(AuthError::Forbidden("Admin access required".into()).into());
            }
            Ok(AdminUser(user))
        })
    }
}

/// Optional identity for public reads. Never touches storage.
#[derive(Debug, Default)]
pub struct MaybeClaims(pub Option<Claims>);

impl MaybeClaims {
    pub fn identity(&self) -> Option<Identity> {
        self.0.as_ref().and_then(|claims| claims.identity().ok())
    }
}

impl FromRequest for MaybeClaims {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(MaybeClaims(req.extensions().get::<Claims>().cloned())))
    }
}
