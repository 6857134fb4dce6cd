use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;
use std::sync::Arc;

mod api;
mod attendance;
mod config;
mod db;
mod docs;
mod model;
mod notify;
mod routes;
mod utils;

use attendance::sweep::{self, SweepKind};
use config::Config;
use db::init_db;
use notify::{LogNotifier, Notifier};

use crate::docs::ApiDoc;
use crate::utils::finger_cache;
use crate::utils::finger_filter;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Attendance Management System"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await;

    let pool_for_filter_warmup = pool.clone();
    let pool_for_cache_warmup = pool.clone();
    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    actix_web::rt::spawn(async move {
        if let Err(e) = finger_filter::warmup_finger_filter(&pool_for_filter_warmup, 100).await {
            eprintln!("Failed to warmup fingerprint filter: {:?}", e);
        }
    });

    actix_web::rt::spawn(async move {
        // Warm up enrolled fingerprints in batches of 250
        if let Err(e) = finger_cache::warmup_finger_cache(&pool_for_cache_warmup, 250).await {
            eprintln!("Failed to warmup fingerprint cache: {:?}", e);
        }
    });

    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

    sweep::spawn_sweep_schedulers(
        pool.clone(),
        notifier.clone(),
        [
            (SweepKind::Midday, config.sweep_midday_at),
            (SweepKind::Evening, config.sweep_evening_at),
            (SweepKind::AutoCheckout, config.sweep_auto_checkout_at),
            (SweepKind::PastDay, config.sweep_past_day_at),
        ],
    );

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(Data::new(notifier.clone()))
            .service(index)
            // Rate-limited API routes
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
