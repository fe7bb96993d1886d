use actix_web::web;

use crate::handlers::{json_error::not_found, system::health_check};

mod applications;
mod auth;
mod companies;
mod experiences;
mod jobs;
mod json_error;
mod reviews;
mod rounds;
mod users;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(json_error::config_routes);

    cfg.service(health_check);

    cfg.service(
        web::scope("/api")
            .configure(auth::config_routes)
            .configure(users::config_routes)
            .configure(companies::config_routes)
            .configure(jobs::config_routes)
            .configure(applications::config_routes)
            .configure(reviews::config_routes)
            .configure(rounds::config_routes)
            .configure(experiences::config_routes)
    );

    cfg.default_service(web::to(not_found));
}
