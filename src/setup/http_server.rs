use actix_web::{middleware, web, App, HttpServer};
use log::info;

use crate::config::ServerConfig;
use crate::infrastructure::web::cors;
use crate::setup::use_case_initializer::UseCases;

#[derive(Clone)]
pub struct AppState {
    pub use_cases: UseCases,
}

pub async fn run_http_server(server: &ServerConfig, use_cases: UseCases) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState { use_cases });

    info!("Listening on {}:{}", server.host, server.port);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(cors::cors_headers())
            .wrap(middleware::Logger::default())
            .configure(crate::infrastructure::web::configure)
    })
    .bind((server.host.as_str(), server.port))?
    .run()
    .await
}
