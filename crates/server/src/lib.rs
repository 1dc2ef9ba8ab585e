mod access_log;
mod error;
pub mod logger;

use std::{net::SocketAddr, time::Duration};

use access_log::AccessLogLayer;
use axum::{Json, Router, response::IntoResponse, routing::get};
use axum_server::{Handle, tls_rustls::RustlsConfig};
use config::{AllowedOrigins, Config, CorsConfig};
use http::HeaderValue;
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub use error::Error;

pub(crate) type Result<T> = std::result::Result<T, error::Error>;

const GRACEFUL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything needed to run the HTTP server.
pub struct ServeConfig {
    pub listen_address: SocketAddr,
    pub config: Config,
    /// Cancelling this token stops accepting connections and drains in-flight requests.
    pub shutdown_signal: CancellationToken,
    /// Log filter, e.g. `info` or `server=debug,llm=debug`.
    pub log_filter: String,
}

pub async fn serve(
    ServeConfig {
        listen_address,
        config,
        shutdown_signal,
        log_filter,
    }: ServeConfig,
) -> crate::Result<()> {
    logger::init(&log_filter);

    let app = router(&config)?;

    let listener = TcpListener::bind(listen_address).await.map_err(error::Error::Bind)?;

    match &config.server.tls {
        Some(tls_config) => {
            let rustls_config = RustlsConfig::from_pem_file(&tls_config.certificate, &tls_config.key)
                .await
                .map_err(|e| error::Error::Tls(e.to_string()))?;

            log::info!("BoxAI listening on https://{listen_address}");

            // axum-server wants a std listener
            let std_listener = listener.into_std().map_err(error::Error::Bind)?;

            let handle = Handle::new();

            tokio::spawn({
                let handle = handle.clone();

                async move {
                    shutdown_signal.cancelled().await;
                    log::info!("Shutting down");
                    handle.graceful_shutdown(Some(GRACEFUL_SHUTDOWN_TIMEOUT));
                }
            });

            axum_server::from_tcp_rustls(std_listener, rustls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .map_err(|e| error::Error::Server(std::io::Error::other(e)))?;
        }
        None => {
            log::info!("BoxAI listening on http://{listen_address}");

            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_signal.cancelled().await;
                    log::info!("Shutting down");
                })
                .await
                .map_err(error::Error::Server)?;
        }
    }

    Ok(())
}

/// Builds the full application router from the configuration.
fn router(config: &Config) -> crate::Result<Router> {
    let mut app = Router::new().route("/", get(root));

    if config.server.health.enabled {
        app = app.route(&config.server.health.path, get(health));
    }

    app = app.merge(llm::router(config).map_err(error::Error::Llm)?);

    if let Some(cors) = &config.server.cors {
        app = app.layer(cors_layer(cors)?);
    }

    Ok(app.layer(AccessLogLayer))
}

fn cors_layer(config: &CorsConfig) -> crate::Result<CorsLayer> {
    let origins = match &config.allow_origins {
        AllowedOrigins::Any => AllowOrigin::any(),
        AllowedOrigins::List(origins) => {
            let origins = origins
                .iter()
                .map(|origin| HeaderValue::from_str(origin).map_err(|_| error::Error::CorsOrigin(origin.clone())))
                .collect::<crate::Result<Vec<_>>>()?;

            AllowOrigin::list(origins)
        }
    };

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any))
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "BoxAI API is running. Use POST /ask to interact with LLMs."
    }))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}
