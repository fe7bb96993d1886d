use actix_web::web;

use crate::handlers::reviews;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reviews")
            .service(
                web::resource("")
                    .route(web::post().to(reviews::create_review))
            )
            .service(
                web::resource("/my-reviews")
                    .route(web::get().to(reviews::my_reviews))
            )
            .service(
                web::resource("/company/{company_id}")
                    .route(web::get().to(reviews::company_reviews))
            )
            .service(
                web::resource("/{review_id}")
                    .route(web::get().to(reviews::get_review))
                    .route(web::put().to(reviews::update_review))
                    .route(web::delete().to(reviews::delete_review))
            )
            .service(
                web::resource("/{review_id}/helpful")
                    .route(web::post().to(reviews::mark_helpful))
            )
            .service(
                web::resource("/{review_id}/report")
                    .route(web::post().to(reviews::report_review))
            )
    );
}
