use clap::Parser;
use tokio::net::TcpListener;

use steam_card::card::CardService;
use steam_card::cli::Cli;
use steam_card::error::AppError;
use steam_card::steam::SteamClient;
use steam_card::{http, logging};

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    logging::init(cli.log_format);

    if dotenv.is_err() {
        tracing::debug!("no .env file found");
    }

    if let Err(err) = run(cli).await {
        tracing::error!(code = err.code(), "{err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let allowed_origins = cli.allowed_origins()?;
    if allowed_origins.is_empty() {
        tracing::warn!("CORS allows any origin with credentials; set STEAM_CARD_ALLOWED_ORIGINS in production");
    }

    let steam = SteamClient::new(cli.api_key.as_str(), cli.api_base_url.clone(), cli.timeout())?;
    let service = CardService::new(steam, cli.locale);
    let app = http::router(service, http::cors_layer(&allowed_origins));

    let listener = TcpListener::bind(cli.bind)
        .await
        .map_err(|e| AppError::Internal(format!("bind {}: {e}", cli.bind)))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| AppError::Internal(e.to_string()))?;
    tracing::info!("listening on {local_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Internal(format!("server: {e}")))?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {err}");
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
                tracing::error!("failed to listen for SIGTERM: {err}");
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

    tracing::info!("shutdown signal received, draining connections");
}
