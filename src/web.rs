use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum::http::StatusCode;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api;
use crate::config::{WeatherCardConfig, WeatherConfig};
use crate::service::CardService;

const MAX_BODY_BYTES: usize = 64 * 1024;
const TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Server-side request deadline, longer than a weather lookup with all its retries
#[must_use]
pub fn request_timeout(weather: &WeatherConfig) -> Duration {
    weather.request_budget() + TIMEOUT_MARGIN
}

/// Full application router: the JSON API under `/api`, static files otherwise.
/// Requests running past `timeout` get 504 Gateway Timeout.
pub fn app(service: Arc<CardService>, static_dir: &str, timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::router(service))
        .fallback_service(ServeDir::new(static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::GATEWAY_TIMEOUT,
                    timeout,
                )),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn run(config: &WeatherCardConfig, service: Arc<CardService>) -> anyhow::Result<()> {
    let app = app(
        service,
        &config.server.static_dir,
        request_timeout(&config.weather),
    );
    let config = &config.server;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    match (&config.tls_cert_path, &config.tls_key_path) {
        (Some(cert), Some(key)) => serve_tls(app, addr, cert, key).await,
        _ => {
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind {addr}"))?;
            info!("Web server running at http://localhost:{}", config.port);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("Web server failed")
        }
    }
}

#[cfg(feature = "tls")]
async fn serve_tls(app: Router, addr: SocketAddr, cert: &str, key: &str) -> anyhow::Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let pem = std::fs::File::open(cert).with_context(|| format!("Cannot open {cert}"))?;
    let certs = rustls_pemfile::certs(&mut std::io::BufReader::new(pem))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid PEM in {cert}"))?;
    if certs.is_empty() {
        anyhow::bail!("No certificate found in {cert}");
    }

    let tls = RustlsConfig::from_pem_file(cert, key)
        .await
        .context("Failed to load TLS certificate and key")?;

    let handle = axum_server::Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.graceful_shutdown(Some(Duration::from_secs(10)));
    });

    info!("Web server running at https://localhost:{}", addr.port());
    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .context("Web server failed")
}

#[cfg(not(feature = "tls"))]
async fn serve_tls(_app: Router, _addr: SocketAddr, _cert: &str, _key: &str) -> anyhow::Result<()> {
    anyhow::bail!("TLS is configured but this build lacks the `tls` feature")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! { () = ctrl_c => {}, () = terminate => {}, }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_timeout_outlasts_weather_retries() {
        let weather = WeatherConfig::default();
        assert!(request_timeout(&weather) > weather.request_budget());
        assert_eq!(request_timeout(&weather), Duration::from_secs(155));
    }
}
