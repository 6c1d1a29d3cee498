//! app.rs
use crate::handlers::tracking_handler;
use actix_web::web;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/track")
            .route(
                "/open/{tracking_id}/pixel.png",
                web::get().to(tracking_handler::track_open_endpoint),
            )
            .route(
                "/click/{tracking_id}/",
                web::get().to(tracking_handler::track_click_endpoint),
            ),
    );
}
