/*
Cross-origin headers

Every response carries permissive CORS headers so the endpoints can be called
from browser clients, and preflight requests are answered with a plain `ok`.
*/

use actix_web::middleware::DefaultHeaders;
use actix_web::http::Method;
use actix_web::{HttpRequest, HttpResponse};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", ALLOW_ORIGIN))
        .add(("Access-Control-Allow-Headers", ALLOW_HEADERS))
}

/// `OPTIONS` handler.
pub async fn preflight() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

/// Fallback for unmatched paths: preflight on `OPTIONS`, 404 otherwise.
pub async fn preflight_or_not_found(req: HttpRequest) -> HttpResponse {
    if req.method() == Method::OPTIONS {
        preflight().await
    } else {
        HttpResponse::NotFound().finish()
    }
}
