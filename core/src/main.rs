mod cors;

use std::sync::Arc;

use actix_web::{
    App, HttpResponse, HttpServer,
    web::{self},
};
use api_subs::services::subscription::SubscriptionService;
use common::env_config::Config;
use db::store::PgSubscriptionStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();
    let origin = config.cors_allowed_origin.clone();
    let logging_enabled = config.console_logging_enabled;

    // init logger
    if logging_enabled {
        logger::setup(&config.log_level, &config.log_file).map_err(std::io::Error::other)?;
    }

    // init db connection
    let pool = db::setup(
        &config.database_url,
        config.is_production(),
        config.db_max_connections,
    )
    .await
    .map_err(|e| std::io::Error::other(format!("Failed to set up database: {}", e)))?;

    let service = web::Data::new(SubscriptionService::new(Arc::new(
        PgSubscriptionStore::new(pool.clone()),
    )));

    log::info!(
        "starting server on {}:{}",
        config.server_host,
        config.server_port
    );

    let server = HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(logger::middleware(logging_enabled)) // 2nd
            .wrap(cors::middleware(&origin)) // 1st
            .route("/healthz", web::get().to(|| async { HttpResponse::Ok().body("ok") }))
            .service(web::scope("/api").service(api_subs::mount_subscriptions()))
            .service(api_subs::docs::swagger_ui())
    })
    .client_request_timeout(config.timeouts.request)
    .client_disconnect_timeout(config.timeouts.disconnect)
    .keep_alive(config.timeouts.keep_alive)
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await;

    pool.close().await;
    log::info!("database connection closed");
    server
}
