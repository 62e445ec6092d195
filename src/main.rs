//Third-party-dependencies
use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use log::info;
use std::sync::Arc;

use hackops_service::config::AppConfig;
use hackops_service::routes::{schedule_routes, team_routes};
use hackops_service::state::AppState;
use hackops_service::store::FileStore;
use hackops_service::utils::auth_middleware::Authentication;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    let store = Arc::new(FileStore::open(&config.storage_dir)?);
    let state = web::Data::new(AppState::new(store, &config));
    let secret = config.jwt_secret.clone();

    info!("Server started at {}", config.address);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Authentication::new(secret.clone()))
            .wrap(Cors::permissive())
            .configure(team_routes::init_routes)
            .configure(schedule_routes::init_routes)
    })
    .bind(&config.address)?
    .run()
    .await
}
