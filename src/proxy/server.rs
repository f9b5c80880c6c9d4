use crate::modules::credential::{CredentialVerifier, SharedSecret};
use crate::proxy::config::PortalConfig;
use crate::proxy::upstream::UpstreamClient;
use axum::{
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// Axum application state
#[derive(Clone)]
pub struct AppState {
    /// Credential check shared by login and the auth gate
    pub verifier: Arc<dyn CredentialVerifier>,
    pub upstream: Arc<UpstreamClient>,
    /// Mark the session cookie `Secure`
    pub secure_cookies: bool,
    pub max_page_size: Option<u32>,
}

impl AppState {
    pub fn from_config(config: &PortalConfig) -> Result<Self, String> {
        let verifier = Arc::new(SharedSecret::new(config.auth.shared_secret.clone()));
        Self::with_verifier(config, verifier)
    }

    /// Build state around a custom credential strategy
    pub fn with_verifier(
        config: &PortalConfig,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Result<Self, String> {
        let upstream = UpstreamClient::new(&config.upstream)?;

        Ok(Self {
            verifier,
            upstream: Arc::new(upstream),
            secure_cookies: config.environment.is_production(),
            max_page_size: config.upstream.max_page_size,
        })
    }
}

/// Build the portal router
pub fn build_router(state: AppState, web_root: &Path) -> Router {
    use crate::proxy::handlers;

    Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/status", get(handlers::auth::status))
        .route("/api/use-cases", get(handlers::use_cases::list_use_cases))
        .route("/healthz", get(health_check_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::proxy::middleware::auth_gate_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .fallback_service(ServeDir::new(web_root).append_index_html_on_directories(true))
}

/// Axum server instance
pub struct AxumServer {
    shutdown_tx: Option<oneshot::Sender<()>>,
    local_addr: SocketAddr,
}

impl AxumServer {
    /// Start Axum server
    pub async fn start(
        host: String,
        port: u16,
        config: &PortalConfig,
    ) -> Result<(Self, tokio::task::JoinHandle<()>), String> {
        let state = AppState::from_config(config)?;
        let app = build_router(state, Path::new(&config.web_root));

        // Bind address
        let addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| format!("Failed to bind address {}: {}", addr, e))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        tracing::info!("Portal server started at http://{}", local_addr);

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let server_instance = Self {
            shutdown_tx: Some(shutdown_tx),
            local_addr,
        };

        let handle = tokio::spawn(async move {
            use hyper::server::conn::http1;
            use hyper_util::rt::TokioIo;
            use hyper_util::service::TowerToHyperService;

            loop {
                tokio::select! {
                    res = listener.accept() => {
                        match res {
                            Ok((stream, _)) => {
                                let io = TokioIo::new(stream);
                                let service = TowerToHyperService::new(app.clone());

                                tokio::task::spawn(async move {
                                    if let Err(err) = http1::Builder::new()
                                        .serve_connection(io, service)
                                        .await
                                    {
                                        debug!("Connection handling ended or error: {:?}", err);
                                    }
                                });
                            }
                            Err(e) => {
                                error!("Failed to accept connection: {:?}", e);
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::info!("Portal server stopped listening");
                        break;
                    }
                }
            }
        });

        Ok((server_instance, handle))
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop the server
    pub fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Health check handler
async fn health_check_handler() -> Response {
    Json(serde_json::json!({
        "status": "ok"
    }))
    .into_response()
}
