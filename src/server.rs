use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context;
use axum::{middleware, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    decompression::RequestDecompressionLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};

use crate::{
    error::ErrorVerbosity,
    middleware::{method_not_allowed::method_not_allowed, not_found::not_found},
    route::{books, frontend},
    service::Service,
    state::ApiState,
    store::BookRepository,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub name: String,
    pub collection: String,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: "exercise-1".to_string(),
            collection: "information".to_string(),
            connect_timeout_secs: 10,
        }
    }
}

impl DatabaseConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Falls back to `127.0.0.1` and the default port of the running service.
    socket_address: Option<SocketAddr>,
    error_verbosity: ErrorVerbosity,
    database: DatabaseConfig,
    /// Directory served under `/css` by the frontend.
    assets_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            socket_address: None,
            error_verbosity: ErrorVerbosity::default(),
            database: DatabaseConfig::default(),
            assets_dir: PathBuf::from("css"),
        }
    }
}

impl ServerConfig {
    pub async fn from_config_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    pub fn with_socket_address(mut self, socket_address: SocketAddr) -> Self {
        self.socket_address = Some(socket_address);
        self
    }

    pub fn with_error_verbosity(mut self, error_verbosity: ErrorVerbosity) -> Self {
        self.error_verbosity = error_verbosity;
        self
    }

    pub fn socket_address(&self, service: Service) -> SocketAddr {
        self.socket_address.unwrap_or_else(|| {
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), service.default_port())
        })
    }

    pub fn error_verbosity(&self) -> ErrorVerbosity {
        self.error_verbosity
    }

    pub fn database(&self) -> &DatabaseConfig {
        &self.database
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }
}

pub struct Server {
    service: Service,
    config: ServerConfig,
    books: Arc<dyn BookRepository>,
}

impl Server {
    pub fn new(service: Service, config: ServerConfig, books: Arc<dyn BookRepository>) -> Self {
        Self {
            service,
            config,
            books,
        }
    }

    fn routes(&self) -> Router<ApiState> {
        match self.service {
            Service::List => books::app::list_app(),
            Service::Create => books::app::create_app(),
            Service::Update => books::app::update_app(),
            Service::Delete => books::app::delete_app(),
            Service::Frontend => frontend::app::app(self.config.assets_dir()),
        }
    }

    /// The complete application of the configured service, ready to be served.
    pub fn router(&self) -> Router {
        let state = ApiState::new(self.config.error_verbosity(), self.books.clone());

        self.routes()
            .fallback(not_found)
            .layer(middleware::from_fn_with_state(
                state.clone(),
                method_not_allowed::<ApiState>,
            ))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(
                        TraceLayer::new_for_http()
                            .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                            .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                            .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
                    )
                    .layer(RequestDecompressionLayer::new())
                    .layer(CompressionLayer::new())
                    .layer(CorsLayer::permissive()),
            )
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let socket_address = self.config.socket_address(self.service);
        let app = self.router();

        tracing::info!(service = %self.service, addr = %socket_address, "Starting server");

        let listener = TcpListener::bind(&socket_address)
            .await
            .context("Bind failed")?;

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("CTRL+C received"),
            Err(err) => {
                tracing::error!(%err, "Failed to listen for CTRL+C");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                tracing::info!("SIGTERM received");
            }
            Err(err) => {
                tracing::error!(%err, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down");
}
