//! Configuration types and loading
//!
//! Channel settings are plain data here. The channels crate turns them into
//! validated channel configuration, so range and alias checks live next to
//! the code that uses the values.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings for every channel the process wires up
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Console channel, if enabled
    pub console: Option<ConsoleSettings>,
    /// Email channel, if an SMTP host is configured
    pub email: Option<EmailSettings>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConsoleSettings {
    /// "NONE", "TEXT" or "JSON"
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailSettings {
    pub smtp: SmtpSettings,
    pub from_address: String,
    #[serde(default)]
    pub from_name: Option<String>,
    #[serde(default)]
    pub reply_to: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SmtpSettings {
    pub host: String,
    /// 0 selects the default port of the security scheme
    #[serde(default)]
    pub port: u32,
    /// "", "NONE", "TLS", "STARTTLS", "SSL", "SMTPS"
    #[serde(default)]
    pub security: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub insecure: bool,
    #[serde(default)]
    pub trust: Option<String>,
    /// Seconds; 0 means default, negative means no timeout
    #[serde(default)]
    pub timeout: i64,
    /// Seconds; 0 inherits `timeout`, negative means no timeout
    #[serde(default)]
    pub connection_timeout: i64,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let parse_bool = |v: String| v == "true" || v == "1" || v == "yes";

        // Console
        let console_format = lookup("NOTIFY_CONSOLE_FORMAT");
        let console_enabled = lookup("NOTIFY_CONSOLE")
            .map(parse_bool)
            .unwrap_or(console_format.is_some());
        if console_enabled {
            config.console = Some(ConsoleSettings {
                format: console_format.unwrap_or_default(),
                pretty: lookup("NOTIFY_CONSOLE_PRETTY")
                    .map(parse_bool)
                    .unwrap_or(false),
            });
        }

        // Email
        if let Some(host) = lookup("SMTP_HOST").filter(|h| !h.trim().is_empty()) {
            let from_address = lookup("SMTP_FROM")
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::Missing("SMTP_FROM".to_string()))?;

            config.email = Some(EmailSettings {
                smtp: SmtpSettings {
                    host,
                    port: parse_number(&lookup, "SMTP_PORT")?.unwrap_or(0),
                    security: lookup("SMTP_SECURITY"),
                    user: lookup("SMTP_USER"),
                    password: lookup("SMTP_PASSWORD"),
                    insecure: lookup("SMTP_INSECURE").map(parse_bool).unwrap_or(false),
                    trust: lookup("SMTP_TRUST"),
                    timeout: parse_number(&lookup, "SMTP_TIMEOUT")?.unwrap_or(0),
                    connection_timeout: parse_number(&lookup, "SMTP_CONNECTION_TIMEOUT")?
                        .unwrap_or(0),
                },
                from_address,
                from_name: lookup("SMTP_FROM_NAME"),
                reply_to: lookup("SMTP_REPLY_TO"),
            });
        }

        tracing::debug!(
            console = config.console.is_some(),
            email = config.email.is_some(),
            "Loaded channel configuration"
        );

        Ok(config)
    }

    /// Whether any channel is configured
    pub fn has_channels(&self) -> bool {
        self.console.is_some() || self.email.is_some()
    }
}

fn parse_number<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::invalid(key, e.to_string())),
    }
}
