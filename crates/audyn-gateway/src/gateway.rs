//! The gateway facade: parse a call, delegate to the engine, shape the reply.

use std::path::{Path, PathBuf};

use audyn_torrent_core::{CreateTorrent, TorrentEngine, TorrentHandle, TorrentResult, TorrentStats};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::args::Arguments;
use crate::error::GatewayError;
use crate::request::GatewayRequest;
use crate::response::Reply;

/// Facade that turns caller requests into engine calls.
pub struct TorrentGateway<E> {
    engine: E,
    torrent_dir: PathBuf,
}

impl<E: TorrentEngine> TorrentGateway<E> {
    /// Build a gateway over `engine`; `torrent_dir` receives
    /// `createTorrentInAppDir` output.
    pub fn new(engine: E, torrent_dir: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            torrent_dir: torrent_dir.into(),
        }
    }

    /// Engine behind the gateway.
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Directory used by `createTorrentInAppDir`.
    pub fn torrent_dir(&self) -> &Path {
        &self.torrent_dir
    }

    /// Parse and dispatch one call.
    ///
    /// # Errors
    ///
    /// Returns an invalid-argument error before touching the engine when the
    /// arguments are unusable, `NotImplemented` for unknown methods, and a
    /// native error when the engine fails.
    pub async fn handle(&self, method: &str, args: &Arguments) -> Result<Reply, GatewayError> {
        let result = match GatewayRequest::parse(method, args) {
            Ok(request) => self.dispatch(request).await,
            Err(err) => Err(err),
        };
        if let Err(err) = &result {
            warn!(method, code = err.code(), error = %err.message(), "gateway request failed");
        }
        result
    }

    /// Execute an already-parsed request.
    ///
    /// # Errors
    ///
    /// Returns a native error when the engine fails or a snapshot cannot be
    /// encoded.
    pub async fn dispatch(&self, request: GatewayRequest) -> Result<Reply, GatewayError> {
        debug!(method = request.method(), "dispatching gateway request");
        match request {
            GatewayRequest::GetVersion => Ok(self.engine.version().await?.into()),
            GatewayRequest::AddTorrent(add) => {
                let info_hash = self.engine.add_torrent(add).await?;
                info!(%info_hash, "torrent admitted via gateway");
                Ok(Reply::Bool(true))
            }
            GatewayRequest::CreateTorrent {
                source,
                output,
                trackers,
            } => {
                let wants_file = output.is_some();
                let created = self
                    .engine
                    .create_torrent(CreateTorrent {
                        source,
                        output,
                        trackers,
                        ..CreateTorrent::default()
                    })
                    .await?;
                if wants_file {
                    Ok(Reply::Bool(created.written_to.is_some()))
                } else {
                    Ok(Reply::Bytes(created.metainfo))
                }
            }
            GatewayRequest::CreateTorrentInAppDir { source, trackers } => {
                let output = self.app_dir_output(&source)?;
                let created = self
                    .engine
                    .create_torrent(CreateTorrent {
                        source,
                        output: Some(output),
                        trackers,
                        ..CreateTorrent::default()
                    })
                    .await?;
                Ok(Reply::Bool(created.written_to.is_some()))
            }
            GatewayRequest::RemoveTorrent(handle) => self.remove(handle).await,
            GatewayRequest::RemoveTorrentByInfoHash(info_hash) => {
                self.remove(info_hash.into()).await
            }
            GatewayRequest::RemoveTorrentByName(name) => {
                self.remove(TorrentHandle::Name(name)).await
            }
            GatewayRequest::GetTorrentStats => {
                let stats: Vec<TorrentStats> = self
                    .engine
                    .list()
                    .await?
                    .iter()
                    .map(TorrentStats::from)
                    .collect();
                to_json(&stats)
            }
            GatewayRequest::GetAllTorrents => to_json(&self.engine.list().await?),
            GatewayRequest::GetSwarmInfo(info_hash) => match self.engine.swarm(info_hash).await? {
                Some(swarm) => to_json(&swarm),
                None => Ok(Reply::Null),
            },
            GatewayRequest::GetInfoHash(source) => {
                Ok(Reply::Text(self.engine.info_hash(source).await?.to_hex()))
            }
            GatewayRequest::GetSavePath(handle) => self.save_path(handle).await,
            GatewayRequest::GetTorrentSavePathByName(name) => {
                self.save_path(TorrentHandle::Name(name)).await
            }
            GatewayRequest::StartTorrent(info_hash) => {
                flag_outcome(self.engine.start(info_hash).await)
            }
            GatewayRequest::StopTorrent(info_hash) => {
                flag_outcome(self.engine.stop(info_hash).await)
            }
            GatewayRequest::IsTorrentActive(info_hash) => {
                Ok(Reply::Bool(self.engine.is_active(info_hash).await?))
            }
            GatewayRequest::CleanupSession => {
                self.engine.cleanup().await?;
                Ok(Reply::Null)
            }
        }
    }

    fn app_dir_output(&self, source: &Path) -> Result<PathBuf, GatewayError> {
        let name = source
            .file_name()
            .ok_or(GatewayError::InvalidValue {
                field: "filePath",
                reason: "must name a file or directory",
            })?
            .to_string_lossy();
        Ok(self.torrent_dir.join(format!("{name}.torrent")))
    }

    async fn remove(&self, handle: TorrentHandle) -> Result<Reply, GatewayError> {
        flag_outcome(self.engine.remove_torrent(handle).await)
    }

    async fn save_path(&self, handle: TorrentHandle) -> Result<Reply, GatewayError> {
        let path = self.engine.save_path(handle).await?;
        Ok(Reply::text_or_null(
            path.map(|path| path.display().to_string()),
        ))
    }
}

/// Unknown torrents answer `false`; every other failure is surfaced.
fn flag_outcome(result: TorrentResult<()>) -> Result<Reply, GatewayError> {
    match result {
        Ok(()) => Ok(Reply::Bool(true)),
        Err(err) if err.is_not_found() => {
            debug!(error = %err.detail(), "torrent not in session");
            Ok(Reply::Bool(false))
        }
        Err(err) => Err(err.into()),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Reply, GatewayError> {
    serde_json::to_string(value)
        .map(Reply::Text)
        .map_err(|source| GatewayError::Encode { source })
}
