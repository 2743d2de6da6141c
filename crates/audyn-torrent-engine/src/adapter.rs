//! Async facade that forwards engine calls to the background worker.

use std::path::PathBuf;

use async_trait::async_trait;
use audyn_torrent_core::{
    AddTorrent, CreateTorrent, CreatedTorrent, InfoHash, SwarmInfo, TorrentDescriptor,
    TorrentEngine, TorrentHandle, TorrentResult, TorrentSource,
};
use tokio::sync::{mpsc, oneshot};

use crate::command::{EngineCommand, Responder};
use crate::error::{EngineError, op_failed};
use crate::types::EngineConfig;
use crate::worker;

const COMMAND_BUFFER: usize = 128;

/// In-process torrent engine backed by a single worker task.
///
/// Clones share the same worker and session.
#[derive(Clone)]
pub struct LocalTorrentEngine {
    commands: mpsc::Sender<EngineCommand>,
}

impl LocalTorrentEngine {
    /// Spawn an engine with default authoring settings.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Spawn an engine with explicit authoring settings.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
        worker::spawn(config, rx);
        Self { commands }
    }

    async fn request<T>(
        &self,
        operation: &'static str,
        build: impl FnOnce(Responder<T>) -> EngineCommand,
    ) -> TorrentResult<T> {
        let (respond_to, rx) = oneshot::channel();
        self.commands
            .send(build(respond_to))
            .await
            .map_err(|_| op_failed(operation, None, EngineError::WorkerUnavailable { operation }))?;
        rx.await
            .map_err(|_| op_failed(operation, None, EngineError::WorkerUnavailable { operation }))?
    }
}

impl Default for LocalTorrentEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TorrentEngine for LocalTorrentEngine {
    async fn version(&self) -> TorrentResult<String> {
        Ok(format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")))
    }

    async fn info_hash(&self, source: TorrentSource) -> TorrentResult<InfoHash> {
        self.request("info_hash", |respond_to| EngineCommand::InfoHash {
            source,
            respond_to,
        })
        .await
    }

    async fn add_torrent(&self, request: AddTorrent) -> TorrentResult<InfoHash> {
        self.request("add_torrent", |respond_to| EngineCommand::Add {
            request: Box::new(request),
            respond_to,
        })
        .await
    }

    async fn create_torrent(&self, request: CreateTorrent) -> TorrentResult<CreatedTorrent> {
        self.request("create_torrent", |respond_to| EngineCommand::Create {
            request: Box::new(request),
            respond_to,
        })
        .await
    }

    async fn remove_torrent(&self, handle: TorrentHandle) -> TorrentResult<()> {
        self.request("remove_torrent", |respond_to| EngineCommand::Remove {
            handle,
            respond_to,
        })
        .await
    }

    async fn list(&self) -> TorrentResult<Vec<TorrentDescriptor>> {
        self.request("list", |respond_to| EngineCommand::List { respond_to })
            .await
    }

    async fn swarm(&self, info_hash: InfoHash) -> TorrentResult<Option<SwarmInfo>> {
        self.request("swarm", |respond_to| EngineCommand::Swarm {
            info_hash,
            respond_to,
        })
        .await
    }

    async fn save_path(&self, handle: TorrentHandle) -> TorrentResult<Option<PathBuf>> {
        self.request("save_path", |respond_to| EngineCommand::SavePath {
            handle,
            respond_to,
        })
        .await
    }

    async fn start(&self, info_hash: InfoHash) -> TorrentResult<()> {
        self.request("start", |respond_to| EngineCommand::SetPaused {
            info_hash,
            paused: false,
            respond_to,
        })
        .await
    }

    async fn stop(&self, info_hash: InfoHash) -> TorrentResult<()> {
        self.request("stop", |respond_to| EngineCommand::SetPaused {
            info_hash,
            paused: true,
            respond_to,
        })
        .await
    }

    async fn is_active(&self, info_hash: InfoHash) -> TorrentResult<bool> {
        self.request("is_active", |respond_to| EngineCommand::IsActive {
            info_hash,
            respond_to,
        })
        .await
    }

    async fn cleanup(&self) -> TorrentResult<()> {
        self.request("cleanup", |respond_to| EngineCommand::Cleanup { respond_to })
            .await
    }
}
