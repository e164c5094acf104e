pub mod cors;
pub mod emergency_controller;
pub mod image_controller;

use actix_web::{guard, web, HttpResponse, Responder};
use serde_json::json;

async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/emergency-push")
            .route(web::post().to(emergency_controller::emergency_push))
            .route(web::route().guard(guard::Options()).to(cors::preflight)),
    )
    .service(
        web::resource("/verify-image")
            .route(web::post().to(image_controller::verify_image))
            .route(web::route().guard(guard::Options()).to(cors::preflight)),
    )
    .service(
        web::resource("/health")
            .route(web::get().to(health))
            .route(web::route().guard(guard::Options()).to(cors::preflight)),
    )
    .default_service(web::to(cors::preflight_or_not_found));
}
