//! Layered application configuration

pub mod settings;

pub use settings::{AppConfig, CorsConfig, MailConfig, ServerConfig, SmtpConfig};
