//! Worklog server - main entry point.
//!
//! Starts the Actix-web server plus the background sync scheduler.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use sea_orm_migration::MigratorTrait;
use tokio::sync::watch;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use worklog_lib::api;
use worklog_lib::auth::JwtKeys;
use worklog_lib::config::Config;
use worklog_lib::crypto::TokenCipher;
use worklog_lib::db;
use worklog_lib::migration::Migrator;
use worklog_lib::services::storage::Storage;
use worklog_lib::sync::{Scheduler, SyncStatus};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL, JWT_SECRET and ENCRYPTION_KEY must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Worklog Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    let cipher = match TokenCipher::new(&config.encryption_key) {
        Ok(cipher) => cipher,
        Err(e) => {
            error!("Invalid ENCRYPTION_KEY: {}", e);
            std::process::exit(1);
        }
    };

    let conn = match db::connect(&config.database_url).await {
        Ok(conn) => conn,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };
    info!("Database connection established");

    if let Err(e) = Migrator::up(&conn, None).await {
        error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }
    info!("Database migrations complete");

    let storage = match &config.storage {
        Some(settings) => match Storage::new(settings).await {
            Ok(storage) => Some(storage),
            Err(e) => {
                error!("Failed to initialize object storage: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            info!("Object storage not configured; report uploads disabled");
            None
        }
    };

    let jwt_keys = JwtKeys::new(&config.jwt_secret, config.jwt_expiry_hours);
    let status = Arc::new(SyncStatus::new());

    // Shutdown signal for the background loops; dropping the sender on
    // process exit stops them.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    if config.sync.enabled {
        let scheduler = Arc::new(Scheduler::new(
            conn.clone(),
            cipher.clone(),
            storage.clone(),
            config.sync.clone(),
            Arc::clone(&status),
        ));
        scheduler.start(shutdown_rx);
    } else {
        info!("Background sync disabled");
        drop(shutdown_rx);
    }

    let bind_address = config.bind_address();
    let is_development = config.is_development();
    info!("Starting server at http://{}", bind_address);

    let server = HttpServer::new(move || {
        let cors = if is_development {
            Cors::permissive()
        } else {
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600)
        };

        let mut app = App::new()
            .wrap(cors)
            .app_data(web::Data::new(conn.clone()))
            .app_data(web::Data::new(cipher.clone()))
            .app_data(web::Data::new(jwt_keys.clone()))
            .app_data(web::Data::from(Arc::clone(&status)));

        if let Some(storage) = &storage {
            app = app.app_data(web::Data::new(storage.clone()));
        }

        app.service(
            web::scope("/api/v1")
                .configure(api::configure_health_routes)
                .configure(api::configure_auth_routes)
                .configure(api::configure_user_routes)
                .configure(api::configure_repository_routes)
                .configure(api::configure_commit_routes)
                .configure(api::configure_sync_routes)
                .configure(api::configure_report_routes)
                .configure(api::configure_template_routes),
        )
    });

    let result = server.bind(&bind_address)?.run().await;

    // Stop the background loops before exiting.
    let _ = shutdown_tx.send(true);

    result
}
