//! HTTP server for the listings API

use crate::{
    api,
    blogs::BlogService,
    config::{Config, MediaBackend},
    error::{Error, Result},
    listings::ListingService,
    media::{MediaService, MediaStorage},
    store::{SqliteBlogStore, SqliteListingStore},
};
use axum::{http::HeaderValue, routing::get, Router};
use common::persistence::{establish_sqlite_pool_with_retry, HealthCheck, Migrate};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Main server structure
pub struct Server {
    config: Arc<Config>,
    app: Router,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,

    pub listings: ListingService,

    pub media: MediaService,

    pub blogs: BlogService,

    /// Document store probe for the health endpoint
    pub database: Arc<dyn HealthCheck>,

    /// Prometheus recorder handle, when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Connect the stores and object storage described by `config`
    pub async fn from_config(config: Arc<Config>, metrics: Option<PrometheusHandle>) -> Result<Self> {
        let pool = establish_sqlite_pool_with_retry(&config.database).await?;

        let listing_store = Arc::new(SqliteListingStore::new(pool.clone()));
        let blog_store = Arc::new(SqliteBlogStore::new(pool));

        if config.database.run_migrations {
            listing_store.run_migrations().await?;
            blog_store.run_migrations().await?;
        } else {
            info!("Skipping database migrations");
        }

        let storage = MediaStorage::from_config(&config.media)?;

        let listings = ListingService::new(
            listing_store.clone(),
            listing_store.clone(),
            &config.allocator,
        );

        Ok(Self {
            media: MediaService::new(storage, listing_store.clone()),
            blogs: BlogService::new(blog_store),
            database: listing_store,
            listings,
            metrics,
            config,
        })
    }
}

impl Server {
    /// Create a new server instance
    pub async fn new(config: Config) -> Result<Self> {
        info!("Initializing listings API server");

        let config = Arc::new(config);

        let metrics = if config.telemetry.enable_metrics {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .map_err(|e| Error::Internal {
                    message: format!("Failed to install metrics recorder: {e}"),
                })?;
            Some(handle)
        } else {
            None
        };

        let state = AppState::from_config(config.clone(), metrics).await?;
        let app = Self::build_router(state);

        Ok(Self { config, app })
    }

    /// Build the application router with all routes and middleware
    pub fn build_router(state: AppState) -> Router {
        let config = &state.config;

        let allow_origin = if config.server.allows_any_origin() {
            AllowOrigin::any()
        } else {
            let origins = config
                .server
                .cors_origins
                .iter()
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!(origin = %origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect::<Vec<_>>();
            AllowOrigin::list(origins)
        };

        let cors = CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(Any)
            .allow_headers(Any);

        let middleware = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(config.request_timeout()))
            .layer(cors);

        let mut app = Router::new()
            .nest("/api/v1", api::routes(state.clone()))
            .merge(api::docs_routes());

        if !matches!(config.media.backend, MediaBackend::Aws { .. }) {
            app = app.route(
                "/media-files/*key",
                get(api::routes::media::serve_media_file),
            );
        }

        if state.metrics.is_some() {
            app = app.route(
                &config.telemetry.metrics_path,
                get(api::routes::metrics::render_metrics),
            );
        }

        app.layer(axum::middleware::from_fn(api::middleware::track_metrics))
            .layer(middleware)
            .with_state(state)
    }

    /// Run the server until shutdown signal
    pub async fn run(self) -> Result<()> {
        let addr = self.config.server.bind_address;

        info!("Starting HTTP server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Internal {
                message: format!("Failed to bind to address {addr}: {e}"),
            })?;

        info!("Listings API listening on {}", addr);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Internal {
                message: format!("Server error: {e}"),
            })?;

        Ok(())
    }
}

/// Shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            warn!("Received terminate signal, shutting down");
        },
    }
}
