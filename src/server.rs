//! Tracing setup and the long-running server.

use std::sync::Arc;

use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use conductor_api::{ApiServer, AppState, ServerConfig, health_report};
use conductor_config::Config;

use crate::BoxError;
use crate::conductor_dir;
use crate::register::bootstrap;

/// Initialize tracing with console and file output.
///
/// Log files are written to ~/.conductor/logs/ with daily rotation.
pub(crate) fn init_tracing() -> Result<(), BoxError> {
    let log_dir = conductor_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("conductor")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes buffered lines on drop and must outlive every log call.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

/// Run the HTTP API until ctrl-c.
pub(crate) async fn run_server(
    config: Config,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), BoxError> {
    info!("Starting Conductor v{}", env!("CARGO_PKG_VERSION"));

    let runtime = bootstrap(&config).await?;
    let state = Arc::new(AppState::new(runtime.engine, runtime.tools));

    let server_config = ServerConfig::new(
        host.unwrap_or(config.server.host),
        port.unwrap_or(config.server.port),
    );
    let server = ApiServer::new(server_config, state);
    server
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
}

/// Print the same summary `/health` serves, built from local configuration.
pub(crate) async fn print_health(config: &Config) -> Result<(), BoxError> {
    let runtime = bootstrap(config).await?;
    let state = AppState::new(runtime.engine, runtime.tools);
    let report = health_report(&state).await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
