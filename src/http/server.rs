//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router dispatching every path and method to the SMS event handler
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Read per-request variables from inbound headers
//! - Bind server to listener and drain on shutdown

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Request},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::PublisherConfig;
use crate::handler::{HeaderVariables, SmsEventHandler};
use crate::http::request::{request_id, UuidRequestId};
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<SmsEventHandler>,
    pub api_key_header: Arc<str>,
}

/// HTTP server hosting the SMS event handler.
pub struct HttpServer {
    router: Router,
    config: PublisherConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: PublisherConfig) -> Result<Self, reqwest::Error> {
        let handler = SmsEventHandler::from_config(&config)?;
        Ok(Self::with_handler(config, handler))
    }

    /// Create a server around an already-built handler.
    pub fn with_handler(config: PublisherConfig, handler: SmsEventHandler) -> Self {
        let state = AppState {
            handler: Arc::new(handler),
            api_key_header: Arc::from(config.variables.api_key_header.as_str()),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &PublisherConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(publish_handler))
            .route("/{*path}", any(publish_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        request_id = %request_id(request),
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                }),
            )
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// Ctrl+C, SIGTERM or `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            app_name = %self.config.stream.app_name,
            stream_name = %self.config.stream.stream_name,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Entry point for every inbound request.
async fn publish_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    let variables = HeaderVariables::new(&headers, &state.api_key_header);

    let response = state.handler.handle(&variables, &body).await;

    tracing::debug!(
        status = response.status.as_u16(),
        outcome = response.outcome.as_str(),
        "Request handled"
    );
    metrics::record_request(response.outcome.as_str(), response.status.as_u16(), start);

    response.into_response()
}
