use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub smtp: SmtpConfig,
    pub mail: MailConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Outbound SMTP relay settings. TLS is always implicit (wrapper mode).
#[derive(Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub to: String,
    /// Seconds before the SMTP client gives up on a command.
    pub timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Display name bound to `smtp.from`.
    pub sender: String,
    pub footer: String,
    /// Escape markup-significant characters in the HTML rendering.
    pub escape: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            smtp: SmtpConfig::default(),
            mail: MailConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 465,
            user: None,
            password: None,
            from: "noreply@localhost".to_string(),
            to: "contact@localhost".to_string(),
            timeout: 60,
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender: "SKYKIN Contact Form".to_string(),
            footer: "This email was sent from the SKYKIN Technologies contact form at skykin.tech"
                .to_string(),
            escape: true,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("from", &self.from)
            .field("to", &self.to)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SmtpConfig {
    /// True when both the user and the password are present and non-empty.
    pub fn has_credentials(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.user) && present(&self.password)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?);

        if std::path::Path::new("config.toml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(
            Environment::with_prefix("APP")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port cannot be 0".to_string()));
        }

        if self.smtp.port == 0 {
            return Err(ConfigError::Message("SMTP port cannot be 0".to_string()));
        }

        if self.smtp.timeout == 0 {
            return Err(ConfigError::Message(
                "SMTP timeout must be greater than 0".to_string(),
            ));
        }

        if self.smtp.from.is_empty() {
            return Err(ConfigError::Message(
                "SMTP sender address cannot be empty".to_string(),
            ));
        }

        if self.smtp.to.is_empty() {
            return Err(ConfigError::Message(
                "SMTP recipient address cannot be empty".to_string(),
            ));
        }

        if self.mail.sender.is_empty() {
            return Err(ConfigError::Message(
                "Mail sender name cannot be empty".to_string(),
            ));
        }

        if !self.smtp.has_credentials() {
            tracing::warn!("SMTP credentials not set - contact submissions will be refused");
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
