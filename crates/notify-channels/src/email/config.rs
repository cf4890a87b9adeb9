//! Mail server and sender configuration

use std::fmt;
use std::str::FromStr;

use notify_core::config::{EmailSettings, SmtpSettings};
use notify_core::ConfigError;
use serde::{Deserialize, Serialize};

/// Transport security scheme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MailServerSecurity {
    /// Plain SMTP
    #[default]
    None,
    /// STARTTLS upgrade on the submission port
    Tls,
    /// Implicit TLS (SMTPS)
    Ssl,
}

impl MailServerSecurity {
    pub fn default_port(&self) -> u16 {
        match self {
            Self::None => 25,
            Self::Tls => 587,
            Self::Ssl => 465,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Tls => "TLS",
            Self::Ssl => "SSL",
        }
    }

    /// Parse an optional setting; an unset value means [`MailServerSecurity::None`]
    pub fn from_setting(value: Option<&str>) -> Result<Self, ConfigError> {
        value.map_or(Ok(Self::None), str::parse)
    }
}

impl FromStr for MailServerSecurity {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "" | "NONE" | "NULL" => Ok(Self::None),
            "TLS" | "STARTTLS" => Ok(Self::Tls),
            "SSL" | "SMTPS" => Ok(Self::Ssl),
            _ => Err(ConfigError::invalid(
                "security",
                format!("Unknown security type: {}", value),
            )),
        }
    }
}

impl fmt::Display for MailServerSecurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("NONE"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Unvalidated mail server settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailServerParams {
    pub host: String,
    /// 0 selects the scheme default
    pub port: u32,
    pub security: MailServerSecurity,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Relax certificate checks
    pub insecure: bool,
    /// Hosts whose certificates are trusted as-is ("*" for any)
    pub trust: Option<String>,
    /// Seconds; 0 means default, negative means none
    pub timeout: i64,
    /// Seconds; 0 inherits `timeout`, negative means none
    pub connection_timeout: i64,
}

/// Validated mail server configuration
#[derive(Clone, PartialEq, Eq)]
pub struct MailServerConfig {
    host: String,
    port: u16,
    security: MailServerSecurity,
    user: Option<String>,
    password: Option<String>,
    insecure: bool,
    trust: Option<String>,
    timeout: i64,
    connection_timeout: i64,
}

impl MailServerConfig {
    pub fn new(params: MailServerParams) -> Result<Self, ConfigError> {
        if params.host.trim().is_empty() {
            return Err(ConfigError::Missing("host".to_string()));
        }

        let port = match params.port {
            0 => params.security.default_port(),
            port => u16::try_from(port)
                .map_err(|_| ConfigError::invalid("port", "Port number must not exceed 65535"))?,
        };

        Ok(Self {
            host: params.host.trim().to_string(),
            port,
            security: params.security,
            user: params.user,
            password: params.password,
            insecure: params.insecure,
            trust: params.trust.filter(|t| !t.trim().is_empty()),
            timeout: params.timeout,
            connection_timeout: params.connection_timeout,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn security(&self) -> MailServerSecurity {
        self.security
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn insecure(&self) -> bool {
        self.insecure
    }

    pub fn trust(&self) -> Option<&str> {
        self.trust.as_deref()
    }

    pub fn timeout(&self) -> i64 {
        self.timeout
    }

    pub fn connection_timeout(&self) -> i64 {
        self.connection_timeout
    }
}

impl fmt::Debug for MailServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("security", &self.security)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("insecure", &self.insecure)
            .field("trust", &self.trust)
            .field("timeout", &self.timeout)
            .field("connection_timeout", &self.connection_timeout)
            .finish()
    }
}

impl TryFrom<&SmtpSettings> for MailServerConfig {
    type Error = ConfigError;

    fn try_from(settings: &SmtpSettings) -> Result<Self, Self::Error> {
        Self::new(MailServerParams {
            host: settings.host.clone(),
            port: settings.port,
            security: MailServerSecurity::from_setting(settings.security.as_deref())?,
            user: settings.user.clone(),
            password: settings.password.clone(),
            insecure: settings.insecure,
            trust: settings.trust.clone(),
            timeout: settings.timeout,
            connection_timeout: settings.connection_timeout,
        })
    }
}

/// Server plus sender identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSenderConfig {
    server: MailServerConfig,
    from_mail: String,
    from_name: Option<String>,
    reply_to: Option<String>,
}

impl EmailSenderConfig {
    pub fn new(server: MailServerConfig, from_mail: impl Into<String>) -> Self {
        Self {
            server,
            from_mail: from_mail.into(),
            from_name: None,
            reply_to: None,
        }
    }

    /// Set the sender display name
    pub fn with_from_name(mut self, name: impl Into<String>) -> Self {
        self.from_name = Some(name.into());
        self
    }

    /// Set the reply-to address
    pub fn with_reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to = Some(address.into());
        self
    }

    pub fn server(&self) -> &MailServerConfig {
        &self.server
    }

    pub fn from_mail(&self) -> &str {
        &self.from_mail
    }

    pub fn from_name(&self) -> Option<&str> {
        self.from_name.as_deref()
    }

    pub fn reply_to(&self) -> Option<&str> {
        self.reply_to.as_deref()
    }
}

impl TryFrom<&EmailSettings> for EmailSenderConfig {
    type Error = ConfigError;

    fn try_from(settings: &EmailSettings) -> Result<Self, Self::Error> {
        let server = MailServerConfig::try_from(&settings.smtp)?;
        Ok(Self {
            server,
            from_mail: settings.from_address.clone(),
            from_name: settings.from_name.clone(),
            reply_to: settings.reply_to.clone(),
        })
    }
}
