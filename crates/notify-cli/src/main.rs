//! notify-send
//!
//! Reads one notification as JSON from a file (or stdin) and dispatches it
//! through every channel configured in the environment.
//!
//! Exit status follows sysexits: 0 on success, 65 for malformed input,
//! 66 for unreadable input, 69 for a permanent delivery failure, 75 for a
//! retryable one and 78 for configuration problems.

use std::process::ExitCode;

use anyhow::Context;
use notify_channels::{ChannelConfig, NotificationDispatcher};
use notify_core::{AppConfig, ConfigError, SendFailure};
use notify_models::{from_json, ParseError};
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EX_DATAERR: u8 = 65;
const EX_NOINPUT: u8 = 66;
const EX_UNAVAILABLE: u8 = 69;
const EX_TEMPFAIL: u8 = 75;
const EX_CONFIG: u8 = 78;

#[derive(Debug, Error)]
#[error("failed to read notification input")]
struct InputError;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    dotenvy::dotenv().ok();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "notify-send failed");
            ExitCode::from(exit_code(&e))
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let source = std::env::args().nth(1).filter(|arg| arg != "-");

    let config = AppConfig::from_env()?;
    if !config.has_channels() {
        return Err(ConfigError::Missing("NOTIFY_CONSOLE or SMTP_HOST".to_string()).into());
    }
    let dispatcher = NotificationDispatcher::from_configs(&ChannelConfig::from_app_config(&config)?)?;

    let input = read_input(source.as_deref()).await?;
    let notification = from_json(&input)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        notification_id = notification.id(),
        channels = ?dispatcher.channel_types(),
        "Sending notification"
    );

    dispatcher.send(&notification).await?;
    Ok(())
}

async fn read_input(path: Option<&str>) -> anyhow::Result<String> {
    let input = match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path)),
        None => {
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .map(|_| buffer)
                .context("reading stdin")
        }
    };
    input.map_err(|e| e.context(InputError))
}

fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(failure) = err.downcast_ref::<SendFailure>() {
        if failure.is_retryable() {
            EX_TEMPFAIL
        } else {
            EX_UNAVAILABLE
        }
    } else if err.downcast_ref::<ParseError>().is_some() {
        EX_DATAERR
    } else if err.downcast_ref::<ConfigError>().is_some() {
        EX_CONFIG
    } else if err.downcast_ref::<InputError>().is_some() {
        EX_NOINPUT
    } else {
        1
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "warn,notify_send=info,notify_channels=info".into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let retryable = anyhow::Error::from(SendFailure::retryable("Temporary server issue: busy"));
        assert_eq!(exit_code(&retryable), EX_TEMPFAIL);

        let permanent = anyhow::Error::from(SendFailure::permanent("SMTP authentication failed"));
        assert_eq!(exit_code(&permanent), EX_UNAVAILABLE);

        let malformed = anyhow::Error::from(from_json("{").unwrap_err());
        assert_eq!(exit_code(&malformed), EX_DATAERR);

        let config = anyhow::Error::from(ConfigError::Missing("SMTP_FROM".into()));
        assert_eq!(exit_code(&config), EX_CONFIG);
    }

    #[tokio::test]
    async fn test_unreadable_input() {
        let err = read_input(Some("/nonexistent/notification.json"))
            .await
            .unwrap_err();
        assert_eq!(exit_code(&err), EX_NOINPUT);
        assert_eq!(err.to_string(), "failed to read notification input");
    }
}
