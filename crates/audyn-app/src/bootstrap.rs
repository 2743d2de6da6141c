use audyn_config::AppConfig;
use audyn_gateway::TorrentGateway;
use audyn_telemetry::{LoggingConfig, init_logging};
use audyn_torrent_engine::LocalTorrentEngine;
use tokio::io::{BufReader, stdin, stdout};
use tracing::info;

use crate::channel::serve;
use crate::error::{AppError, AppResult};

/// Build identifier baked in at compile time, when provided.
const BUILD_SHA: Option<&str> = option_env!("AUDYN_BUILD_SHA");

/// Entry point used by the binary: load config, install logging, and serve
/// the gateway on stdin/stdout until stdin closes.
///
/// # Errors
///
/// Returns an error when configuration is invalid, logging cannot be
/// installed, or the channel fails.
pub async fn run_app() -> AppResult<()> {
    let config = AppConfig::from_env()?;
    init_logging(&LoggingConfig {
        level: &config.log_level,
        format: config.log_format,
        build_sha: BUILD_SHA.unwrap_or("dev"),
    })
    .map_err(|err| AppError::Telemetry {
        detail: err.to_string(),
    })?;

    let gateway = build_gateway(&config);
    info!(
        app_dir = %config.app_dir.display(),
        torrent_dir = %gateway.torrent_dir().display(),
        "torrent gateway ready"
    );
    serve(&gateway, BufReader::new(stdin()), stdout()).await
}

/// Wire the in-process engine and gateway from configuration.
///
/// Must be called from within a Tokio runtime.
#[must_use]
pub fn build_gateway(config: &AppConfig) -> TorrentGateway<LocalTorrentEngine> {
    let engine = LocalTorrentEngine::with_config(config.engine_config());
    TorrentGateway::new(engine, config.torrent_dir.clone())
}
