//! SMTP session settings derived from server configuration

use std::fmt;
use std::time::Duration;

use super::config::{MailServerConfig, MailServerSecurity};

/// Timeout applied when the configured value is 0
pub const DEFAULT_TIMEOUT_SECS: i64 = 30;

/// Trust value meaning "accept any certificate"
pub const TRUST_ALL: &str = "*";

#[derive(Clone, PartialEq, Eq)]
pub struct SmtpCredentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Everything a transport needs to open one SMTP session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub host: String,
    pub port: u16,
    pub security: MailServerSecurity,
    /// Present only when both user and password are configured
    pub credentials: Option<SmtpCredentials>,
    pub insecure: bool,
    /// Verify that the certificate matches `host`
    pub check_server_identity: bool,
    /// Trusted hosts for implicit TLS
    pub trust: Option<String>,
    /// Refuse to continue when STARTTLS is unavailable
    pub starttls_required: bool,
    /// Limit on the exchange after connecting; `None` disables it
    pub timeout: Option<Duration>,
    /// Limit on opening the connection; `None` disables it
    pub connection_timeout: Option<Duration>,
}

impl SessionSettings {
    pub fn from_config(server: &MailServerConfig) -> Self {
        let timeout = match server.timeout() {
            0 => DEFAULT_TIMEOUT_SECS,
            secs => secs,
        };
        let connection_timeout = match server.connection_timeout() {
            0 => timeout,
            secs => secs,
        };

        let credentials = match (server.user(), server.password()) {
            (Some(user), Some(password)) => Some(SmtpCredentials {
                user: user.to_string(),
                password: password.to_string(),
            }),
            _ => None,
        };

        let security = server.security();
        let insecure = server.insecure();

        let trust = match security {
            MailServerSecurity::Ssl => server
                .trust()
                .map(str::to_string)
                .or_else(|| insecure.then(|| TRUST_ALL.to_string())),
            _ => None,
        };

        Self {
            host: server.host().to_string(),
            port: server.port(),
            security,
            credentials,
            insecure,
            check_server_identity: security != MailServerSecurity::None && !insecure,
            trust,
            starttls_required: security == MailServerSecurity::Tls && !insecure,
            timeout: seconds(timeout),
            connection_timeout: seconds(connection_timeout),
        }
    }

    /// Whether certificate chain validation is skipped for this host
    pub fn trusts_any_certificate(&self) -> bool {
        self.insecure
            || self.trust.as_deref().is_some_and(|trust| {
                trust
                    .split_whitespace()
                    .any(|entry| entry == TRUST_ALL || entry.eq_ignore_ascii_case(&self.host))
            })
    }

    /// Upper bound on a whole connect-and-send exchange, when both phases
    /// are bounded
    pub fn exchange_deadline(&self) -> Option<Duration> {
        match (self.connection_timeout, self.timeout) {
            (Some(connect), Some(io)) => Some(connect + io),
            _ => None,
        }
    }
}

fn seconds(secs: i64) -> Option<Duration> {
    u64::try_from(secs)
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}
