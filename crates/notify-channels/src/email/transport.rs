//! Mail transport
//!
//! The transport opens one SMTP session per message and closes it when the
//! exchange ends, whatever the outcome. Opening the connection is limited by
//! the session's connection timeout on its own; the whole exchange is limited
//! by connection timeout plus timeout.

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use super::config::MailServerSecurity;
use super::error::TransportError;
use super::session::SessionSettings;

/// Submits a finished message using the given session settings
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, session: &SessionSettings, message: Message) -> Result<(), TransportError>;
}

/// SMTP transport backed by lettre
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpMailTransport;

impl SmtpMailTransport {
    pub fn new() -> Self {
        Self
    }

    fn build(session: &SessionSettings) -> Result<AsyncSmtpTransport<Tokio1Executor>, TransportError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(session.host.as_str())
            .port(session.port)
            .tls(tls(session)?)
            .timeout(session.connection_timeout);

        if let Some(credentials) = &session.credentials {
            builder = builder.credentials(Credentials::new(
                credentials.user.clone(),
                credentials.password.clone(),
            ));
        }

        Ok(builder.build())
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, session: &SessionSettings, message: Message) -> Result<(), TransportError> {
        let transport = Self::build(session)?;

        debug!(
            host = %session.host,
            port = session.port,
            security = %session.security,
            authenticated = session.credentials.is_some(),
            "Opening SMTP session"
        );

        let exchange = transport.send(message);
        let result = match session.exchange_deadline() {
            Some(deadline) => tokio::time::timeout(deadline, exchange)
                .await
                .map_err(|_| TransportError::Timeout(deadline))?,
            None => exchange.await,
        };

        let response = result?;
        debug!(code = %response.code(), "Mail server accepted message");
        Ok(())
    }
}

fn tls(session: &SessionSettings) -> Result<Tls, TransportError> {
    Ok(match session.security {
        MailServerSecurity::None => Tls::None,
        MailServerSecurity::Tls if session.starttls_required => {
            Tls::Required(tls_parameters(session)?)
        }
        MailServerSecurity::Tls => Tls::Opportunistic(tls_parameters(session)?),
        MailServerSecurity::Ssl => Tls::Wrapper(tls_parameters(session)?),
    })
}

fn tls_parameters(session: &SessionSettings) -> Result<TlsParameters, TransportError> {
    Ok(TlsParameters::builder(session.host.clone())
        .dangerous_accept_invalid_certs(session.trusts_any_certificate())
        .dangerous_accept_invalid_hostnames(!session.check_server_identity)
        .build()?)
}
