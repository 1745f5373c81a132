//! Core library for the contact form relay: configuration, mail pipeline and route handlers.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod mail;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use handlers::routes::{create_routes, SEND_EMAIL_PATH};
pub use mail::{ContactEmail, DeliveryId, MailTransport, SmtpMailer, TransportError};
pub use models::{ContactSubmission, ErrorBody, SendEmailResponse};
pub use services::ContactService;

use axum::Router;
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub contact_service: ContactService,
}

impl AppState {
    pub fn new(contact_service: ContactService) -> Self {
        Self {
            app_name: "Contact Relay".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            contact_service,
        }
    }

    /// Builds the state with an SMTP transport from `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let mailer = SmtpMailer::new(&config.smtp)?;
        Ok(Self::with_transport(config, Arc::new(mailer)))
    }

    pub fn with_transport(config: &AppConfig, transport: Arc<dyn MailTransport>) -> Self {
        let contact_service =
            ContactService::new(config.smtp.clone(), config.mail.clone(), transport);
        Self::new(contact_service)
    }
}

pub fn create_app(state: AppState) -> Router {
    create_app_with_config(state, &AppConfig::default())
}

pub fn create_app_with_config(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .merge(create_routes())
        .layer(middleware::cors::cors_layer_from_config(&config.cors))
        .layer(middleware::logging::logging_layer())
        .with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

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
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
