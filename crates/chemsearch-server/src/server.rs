use std::net::SocketAddr;

use axum::{Router, routing::get};
use chemsearch_export::{ExportPackager, TransientStore};
use chemsearch_storage::DynRecordStore;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::handlers;
use crate::search::{CollectionRegistry, QueryNormalizer, SearchDispatcher};
use crate::storage::create_store;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub normalizer: QueryNormalizer,
    pub dispatcher: SearchDispatcher,
    pub packager: ExportPackager,
}

impl AppState {
    pub fn new(cfg: &AppConfig, store: DynRecordStore) -> Self {
        let registry = CollectionRegistry::new(cfg.collections.clone());
        Self {
            normalizer: QueryNormalizer::new(cfg.search.default_limit),
            dispatcher: SearchDispatcher::new(store, registry),
            packager: ExportPackager::new(TransientStore::new(&cfg.export.transient_dir)),
        }
    }
}

pub struct ChemsearchServer {
    addr: SocketAddr,
    app: Router,
}

/// Build the application router over `store`.
///
/// Creates the transient export directory if it does not exist yet.
pub async fn build_app(cfg: &AppConfig, store: DynRecordStore) -> anyhow::Result<Router> {
    let state = AppState::new(cfg, store);
    state.packager.transient().ensure_root().await?;
    tracing::info!(
        transient_dir = %cfg.export.transient_dir.display(),
        collections = ?state.dispatcher.registry().names(),
        "search state initialized"
    );
    Ok(router(state))
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/search/basic", get(handlers::basic_search))
        .route(
            "/search/advanced",
            get(handlers::advanced_search_without_model),
        )
        .route(
            "/search/advanced/",
            get(handlers::advanced_search_without_model),
        )
        .route("/search/advanced/{model}", get(handlers::advanced_search))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
    store: Option<DynRecordStore>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
            store: None,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    /// Use an existing record store instead of building one from config.
    pub fn with_store(mut self, store: DynRecordStore) -> Self {
        self.store = Some(store);
        self
    }

    pub async fn build(self) -> anyhow::Result<ChemsearchServer> {
        let store = match self.store {
            Some(store) => store,
            None => create_store(&self.config).await?,
        };
        tracing::info!(backend = store.backend_name(), "record store ready");
        let app = build_app(&self.config, store).await?;

        Ok(ChemsearchServer {
            addr: self.addr,
            app,
        })
    }
}

impl ChemsearchServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
