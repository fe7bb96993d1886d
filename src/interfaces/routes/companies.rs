use actix_web::web;

use crate::handlers::companies;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/companies")
            .service(
                web::resource("")
                    .route(web::get().to(companies::list_companies))
                    .route(web::post().to(companies::create_company))
            )
            .service(
                web::resource("/{company_id}")
                    .route(web::get().to(companies::get_company))
                    .route(web::put().to(companies::update_company))
                    .route(web::delete().to(companies::delete_company))
            )
            .service(
                web::resource("/{company_id}/stats")
                    .route(web::get().to(companies::company_stats))
            )
    );
}
