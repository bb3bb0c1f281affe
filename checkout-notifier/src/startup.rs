//! Application startup and lifecycle management.
//!
//! Builds the HTTP router (notify endpoint plus health and metrics), picks the
//! delivery provider and owns the listener.

use crate::config::NotifierConfig;
use crate::handlers::{health_check, metrics_endpoint, not_found, notify, notify_preflight};
use crate::services::{DeliveryOptions, Dispatcher, MessageSender, MockSender, WebDriverSender};
use axum::{middleware::from_fn, routing::get, routing::post, Router};
use service_core::error::AppError;
use service_core::middleware::{
    cors_headers_middleware, metrics_middleware, request_id_middleware, REQUEST_ID_HEADER,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: NotifierConfig,
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(config: NotifierConfig, sender: Arc<dyn MessageSender>) -> Self {
        let dispatcher = Dispatcher::new(
            sender,
            config.recipient.clone(),
            DeliveryOptions::from(&config.delivery),
            config.delivery.send_timeout_secs.map(Duration::from_secs),
        );
        Self { config, dispatcher }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/notify", post(notify).options(notify_preflight))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .fallback(not_found)
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(cors_headers_middleware))
}

fn default_sender(config: &NotifierConfig) -> Arc<dyn MessageSender> {
    if config.delivery.enabled {
        tracing::info!(
            webdriver_url = %config.delivery.webdriver_url,
            "Browser delivery enabled"
        );
        Arc::new(WebDriverSender::new(config.delivery.clone()))
    } else {
        tracing::info!("Browser delivery disabled, using mock sender");
        Arc::new(MockSender::new(true))
    }
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the provider selected by configuration.
    pub async fn build(config: NotifierConfig) -> Result<Self, AppError> {
        let sender = default_sender(&config);
        Self::build_with_sender(config, sender).await
    }

    /// Build the application around an explicit sender.
    pub async fn build_with_sender(
        config: NotifierConfig,
        sender: Arc<dyn MessageSender>,
    ) -> Result<Self, AppError> {
        // port 0 = random port for testing
        let address = config.common.bind_address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            host = %config.common.host,
            port,
            recipient = %config.recipient,
            "Checkout notifier listening"
        );
        if config.delivery.enabled {
            tracing::warn!(
                "Keep the messaging web session logged in on the automation browser profile"
            );
        }

        Ok(Self {
            port,
            listener,
            state: AppState::new(config, sender),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.state.dispatcher
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
