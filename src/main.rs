use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;
use std::sync::Arc;

mod api;
mod attendance;
mod clock;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod notify;
mod routes;
mod store;

use attendance::AttendanceService;
use clock::{Clock, SystemClock};
use config::Config;
use db::init_db;
use notify::{BrevoGateway, NotificationDispatcher, NotificationScheduler};
use store::{MySqlStore, NotificationLog};

use crate::docs::ApiDoc;
use tracing::{info, warn};
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Lunch Management System API"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config).await?;
    let store = Arc::new(MySqlStore::new(pool));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let gateway = Arc::new(BrevoGateway::new(&config.email)?);
    if config.email.api_key.is_none() {
        warn!("BREVO_API_KEY not set, chef notifications will be logged as failed");
    }

    let dispatcher = Arc::new(NotificationDispatcher::new(
        store.clone(),
        store.clone(),
        store.clone(),
        gateway,
        clock.clone(),
        config.email.send_timeout,
    ));

    // The scheduler runs on this (main) runtime; HTTP workers have their own.
    let scheduler = NotificationScheduler::new(
        config.notify_schedule.clone(),
        clock.clone(),
        dispatcher,
        config.scheduler_tick,
    )
    .start();

    let attendance = Data::new(AttendanceService::new(
        store.clone(),
        clock,
        config.attendance_cutoff,
    ));
    let notification_log: Data<dyn NotificationLog> = Data::from(store as Arc<dyn NotificationLog>);

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    let served = HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(attendance.clone())
            .app_data(notification_log.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await;

    scheduler.shutdown().await;
    served?;
    Ok(())
}
