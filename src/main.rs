use std::sync::Arc;

use shop_member_service::{
    adapters::{
        database::{memory::MemoryDatabase, postgres::PostgresDatabase},
        password::Argon2Password,
        token::JwtTokens,
    },
    config::Settings,
    http::{router, AppState},
    telemetry::init_telemetry,
};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    init_telemetry(settings.log.json);

    let tokens = Arc::new(JwtTokens::new(
        &settings.jwt.secret,
        chrono::Duration::seconds(settings.jwt.expiry_seconds),
    ));
    let password = Arc::new(Argon2Password);

    let state = match &settings.database.url {
        Some(url) => {
            let database =
                Arc::new(PostgresDatabase::connect(url, settings.database.max_connections).await?);
            info!("database pool created");
            if settings.database.run_migrations {
                database.migrate().await?;
                info!("migrations applied");
            }
            AppState::new(database.clone(), database, password, tokens)
        }
        None => {
            warn!("no database url configured, using the in-memory database");
            let database = Arc::new(MemoryDatabase::default());
            AppState::new(database.clone(), database, password, tokens)
        }
    };

    let app = router(state).layer(TraceLayer::new_for_http());

    let addr = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received");
}
