use orchard_api::config;
use orchard_api::database::manager::DatabaseManager;
use orchard_api::routes;
use orchard_api::is_production;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orchard_api=info,tower_http=info".into()),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting Orchard API in {:?} mode", config.environment);

    if is_production!() && config.security.jwt_secret.is_empty() {
        eprintln!("JWT_SECRET must be set in production");
        std::process::exit(1);
    }

    if config.database.auto_migrate {
        if let Err(e) = DatabaseManager::run_migrations().await {
            // The server still starts; /health reports the database state
            tracing::warn!("migrations not applied at startup: {}", e);
        }
    }

    let app = routes::app();

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("failed to bind {}: {}", bind_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Orchard API listening on http://{}", bind_addr);

    let serve = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    if let Err(e) = serve.await {
        eprintln!("server error: {}", e);
        std::process::exit(1);
    }

    DatabaseManager::close_all().await;
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("failed to install Ctrl+C handler");
    }
}
