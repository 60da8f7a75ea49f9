use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[derive(Debug)]
pub enum ServerError {
    Config(String),
    InvalidAddress(std::net::AddrParseError),
    TcpBind(std::io::Error),
    Run(std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt::init();

    if let Err(e) = dotenvy::dotenv() {
        info!("no .env file loaded: {}", e);
    }

    let state = gh_contents::AppState::from_env().map_err(|e| {
        error!("invalid configuration: {}", e);
        ServerError::Config(e)
    })?;
    let settings = &state.settings;
    if settings.github_app_id.is_none() || settings.github_private_key.is_none() {
        warn!("GITHUB_APP_ID or GITHUB_PRIVATE_KEY is not set, requests will fail");
    }
    if settings.github_client_id.is_some() {
        info!("GITHUB_CLIENT_ID is set but App tokens are issued with the App ID");
    }
    info!(
        api_url = %settings.github_api_url,
        lookup = ?settings.installation_lookup,
        target = ?settings.target,
        "configuration loaded"
    );

    let app = gh_contents::create_root_app(state);

    let tcp_listener = get_tcp_listener().await?;
    let server = axum::serve(tcp_listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal());
    info!("server starting");

    if let Err(e) = server.await {
        error!("server error: {:?}", e);
        return Err(ServerError::Run(e));
    }

    info!("server stopped");
    Ok(())
}

async fn get_tcp_listener() -> Result<TcpListener, ServerError> {
    let host = std::env::var("APP_HOST").unwrap_or_else(|_| String::from("0.0.0.0"));
    let port = std::env::var("APP_PORT").unwrap_or_else(|_| String::from("3000"));
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(ServerError::InvalidAddress)?;
    info!("binding to {}", addr);

    TcpListener::bind(addr).await.map_err(ServerError::TcpBind)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
