use std::path::PathBuf;

use audyn_torrent_core::{
    AddTorrent, CreateTorrent, CreatedTorrent, InfoHash, SwarmInfo, TorrentDescriptor,
    TorrentHandle, TorrentResult, TorrentSource,
};
use tokio::sync::oneshot;

/// Channel used by the worker to answer a command.
pub(crate) type Responder<T> = oneshot::Sender<TorrentResult<T>>;

/// Command definitions consumed by the engine worker.
#[derive(Debug)]
pub(crate) enum EngineCommand {
    /// Compute the info-hash of a metainfo source.
    InfoHash {
        source: TorrentSource,
        respond_to: Responder<InfoHash>,
    },
    /// Add a torrent to the session.
    Add {
        request: Box<AddTorrent>,
        respond_to: Responder<InfoHash>,
    },
    /// Author a new torrent.
    Create {
        request: Box<CreateTorrent>,
        respond_to: Responder<CreatedTorrent>,
    },
    /// Remove a torrent from the session.
    Remove {
        handle: TorrentHandle,
        respond_to: Responder<()>,
    },
    /// Snapshot every torrent.
    List {
        respond_to: Responder<Vec<TorrentDescriptor>>,
    },
    /// Snapshot the swarm of one torrent.
    Swarm {
        info_hash: InfoHash,
        respond_to: Responder<Option<SwarmInfo>>,
    },
    /// Look up where a torrent's content lives.
    SavePath {
        handle: TorrentHandle,
        respond_to: Responder<Option<PathBuf>>,
    },
    /// Stop (`paused = true`) or start a torrent.
    SetPaused {
        info_hash: InfoHash,
        paused: bool,
        respond_to: Responder<()>,
    },
    /// Whether a torrent is running.
    IsActive {
        info_hash: InfoHash,
        respond_to: Responder<bool>,
    },
    /// Drop the session and everything it holds.
    Cleanup { respond_to: Responder<()> },
}

impl EngineCommand {
    /// Operation label used in logs and errors.
    pub(crate) const fn operation(&self) -> &'static str {
        match self {
            Self::InfoHash { .. } => "info_hash",
            Self::Add { .. } => "add_torrent",
            Self::Create { .. } => "create_torrent",
            Self::Remove { .. } => "remove_torrent",
            Self::List { .. } => "list",
            Self::Swarm { .. } => "swarm",
            Self::SavePath { .. } => "save_path",
            Self::SetPaused { paused: true, .. } => "stop",
            Self::SetPaused { paused: false, .. } => "start",
            Self::IsActive { .. } => "is_active",
            Self::Cleanup { .. } => "cleanup",
        }
    }
}
