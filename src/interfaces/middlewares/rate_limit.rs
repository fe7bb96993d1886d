use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue, RETRY_AFTER},
    Error, HttpResponse,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use std::{
    rc::Rc,
    task::{Context, Poll},
};

use crate::{
    limiter::rate_limiter::{RateDecision, RateLimiterStore},
    utils::get_client_ip::get_client_ip,
};

/// Per-IP sliding-window limit over every `/api` route.
#[derive(Clone)]
pub struct RateLimitMiddleware {
    store: RateLimiterStore,
    trust_x_forwarded_for: bool,
}

impl RateLimitMiddleware {
    pub fn new(store: RateLimiterStore, trust_x_forwarded_for: bool) -> Self {
        RateLimitMiddleware {
            store,
            trust_x_forwarded_for,
        }
    }
}

impl<S> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            store: self.store.clone(),
            trust_x_forwarded_for: self.trust_x_forwarded_for,
        })
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    store: RateLimiterStore,
    trust_x_forwarded_for: bool,
}

impl<S> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        if !req.path().starts_with("/api") {
            return Box::pin(async move { service.call(req).await });
        }

        let client_ip = get_client_ip(req.request(), self.trust_x_forwarded_for);
        let decision = self.store.check(&client_ip);

        Box::pin(async move {
            if !decision.allowed {
                tracing::warn!(client_ip = %client_ip, path = req.path(), "Rate limit exceeded");
                return Ok(too_many_requests(req, &decision));
            }

            let mut res = service.call(req).await?;
            set_limit_headers(res.headers_mut(), &decision);
            Ok(res)
        })
    }
}

fn set_limit_headers(headers: &mut actix_web::http::header::HeaderMap, decision: &RateDecision) {
    headers.insert(HeaderName::from_static("x-ratelimit-limit"), HeaderValue::from(decision.limit));
    headers.insert(HeaderName::from_static("x-ratelimit-remaining"), HeaderValue::from(decision.remaining));
}

fn too_many_requests(req: ServiceRequest, decision: &RateDecision) -> ServiceResponse<BoxBody> {
    let mut response = HttpResponse::TooManyRequests().json(serde_json::json!({
        "success": false,
        "message": "Too many requests from this IP, please try again later."
    }));

    let headers = response.headers_mut();
    set_limit_headers(headers, decision);
    headers.insert(RETRY_AFTER, HeaderValue::from(decision.retry_after.unwrap_or(1)));

    req.into_response(response)
}
