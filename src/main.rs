mod config;
mod domain;
mod infrastructure;
mod presentation;
#[cfg(test)]
mod test_support;
mod usecase;

use std::sync::Arc;

use axum::{Router, routing::get};
use sea_orm::{ConnectOptions, Database};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::{
    config::AppConfig,
    infrastructure::{
        argon2_password_hasher::Argon2PasswordHasher, driver_repository::PostgresDriverRepository,
        identity_service::PostgresIdentityService, jwt_session_issuer::JwtSessionIssuer,
        schema::ensure_schema, trace_log::TraceLog, tracing_navigator::TracingNavigator,
    },
    presentation::handlers::driver_handler::create_driver_router,
    usecase::register_driver_usecase::RegisterDriverUsecase,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // a missing .env file is fine, the environment may already be populated
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;

    let mut opt = ConnectOptions::new(config.database_url.clone());
    opt.max_connections(10)
        .min_connections(1)
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    ensure_schema(&db).await?;

    let identity_service = PostgresIdentityService::new(
        db.clone(),
        Argon2PasswordHasher::new(),
        JwtSessionIssuer::new(config.jwt_secret.clone()),
    );
    let driver_repository = PostgresDriverRepository::new(db.clone());
    let mut register_driver_usecase = RegisterDriverUsecase::new(
        identity_service,
        driver_repository,
        Arc::new(TracingNavigator),
        config.registration.clone(),
    );
    if config.trace_registrations {
        register_driver_usecase = register_driver_usecase.with_observer(Arc::new(TraceLog::new()));
    }
    let register_driver_usecase = Arc::new(register_driver_usecase);

    let app = Router::new()
        .route("/", get(|| async { "Driver signup service" }))
        .nest("/api", create_driver_router(Arc::clone(&register_driver_usecase)));

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // pending login redirects belong to sessions that are going away
            register_driver_usecase.end_session();
        })
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => error!(error = %err, "failed to listen for shutdown signal"),
    }
}
