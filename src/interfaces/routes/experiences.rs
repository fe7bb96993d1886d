use actix_web::web;

use crate::handlers::experiences;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/placement-experiences")
            .service(
                web::resource("")
                    .route(web::get().to(experiences::list_experiences))
                    .route(web::post().to(experiences::create_experience))
            )
            .service(
                web::resource("/my-experiences")
                    .route(web::get().to(experiences::my_experiences))
            )
            .service(
                web::resource("/admin/pending")
                    .route(web::get().to(experiences::pending_experiences))
            )
            .service(
                web::resource("/{experience_id}")
                    .route(web::get().to(experiences::get_experience))
                    .route(web::put().to(experiences::update_experience))
                    .route(web::delete().to(experiences::delete_experience))
            )
            .service(
                web::resource("/{experience_id}/status")
                    .route(web::put().to(experiences::moderate_experience))
            )
            .service(
                web::resource("/{experience_id}/vote-helpful")
                    .route(web::post().to(experiences::vote_helpful))
            )
    );
}
