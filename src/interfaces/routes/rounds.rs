use actix_web::web;

use crate::handlers::rounds;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/rounds")
            .service(
                web::resource("")
                    .route(web::post().to(rounds::create_round))
            )
            .service(
                web::resource("/my-rounds")
                    .route(web::get().to(rounds::my_rounds))
            )
            .service(
                web::resource("/{round_id}")
                    .route(web::get().to(rounds::get_round))
                    .route(web::put().to(rounds::update_round))
                    .route(web::delete().to(rounds::delete_round))
            )
            .service(web::resource("/{round_id}/aptitude").route(web::post().to(rounds::add_aptitude)))
            .service(web::resource("/{round_id}/tech").route(web::post().to(rounds::add_tech)))
            .service(web::resource("/{round_id}/dsa").route(web::post().to(rounds::add_dsa)))
            .service(web::resource("/{round_id}/hr").route(web::post().to(rounds::add_hr)))
    );
}
