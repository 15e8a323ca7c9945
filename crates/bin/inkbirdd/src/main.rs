//! # inkbirdd — Inkbird BLE-to-MQTT daemon
//!
//! Composition root that wires the adapters together and runs the poll loop.
//!
//! ## Responsibilities
//! - Parse command-line arguments and load `inkbird.toml`
//! - Initialise logging
//! - Connect to the MQTT broker (fatal on failure)
//! - Notify systemd once the broker connection is up
//! - Run the poll loop in one-shot or daemon mode
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Exit codes
//! `0` after a one-shot run or a signal shutdown, `1` on configuration or
//! connection failure.
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod cli;
mod config;
mod systemd;

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use inkbird_adapter_ble::{BleError, BleSensor};
use inkbird_adapter_mqtt::{MqttError, MqttPublisher};
use inkbird_app::services::poll_loop::PollLoop;
use inkbird_domain::error::BridgeError;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::Config;

/// Failures that end the process with a non-zero exit code.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("invalid sensor configuration")]
    Sensor(#[from] BleError),
    #[error("MQTT connection error, check the [mqtt] section of the configuration")]
    Messaging(#[from] MqttError),
    #[error("poll loop failed")]
    Loop(#[from] BridgeError),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config_path()) {
        Ok(config) => config,
        Err(err) => {
            let mut fallback = Config::default();
            fallback.apply_env_overrides();
            init_logging(&fallback.logging.filter);
            tracing::error!(error = %report(&err), "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.logging.filter);

    match run(&cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %report(&err), "inkbirdd stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, config: Config) -> Result<(), StartupError> {
    let sensor = BleSensor::new(config.sensor.clone())?;
    let publisher = MqttPublisher::connect(&config.mqtt).await?;

    systemd::notify_ready();

    let settings = config.poll_settings(cli.once);
    tracing::info!(
        sensor = %sensor.address(),
        topic = %settings.topic,
        mode = ?settings.mode,
        "starting poll loop"
    );

    let mut poll = PollLoop::new(sensor, publisher, settings);

    tokio::select! {
        result = poll.run() => result?,
        () = shutdown_signal() => {
            tracing::info!(cycles = poll.cycles(), "shutdown signal received");
            systemd::notify_stopping();
            poll.disconnect().await?;
        }
    }

    Ok(())
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter {filter:?}: {err}, falling back to info");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Render an error with its chain of sources.
fn report(err: &dyn Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::warn!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
