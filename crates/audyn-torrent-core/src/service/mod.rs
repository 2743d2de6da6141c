//! Engine trait implemented by torrent adapters.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::{TorrentError, TorrentResult};
use crate::model::{
    AddTorrent, CreateTorrent, CreatedTorrent, InfoHash, SwarmInfo, TorrentDescriptor,
    TorrentHandle, TorrentSource,
};

/// Primary engine trait implemented by adapters.
#[async_trait]
pub trait TorrentEngine: Send + Sync {
    /// Engine identification string.
    async fn version(&self) -> TorrentResult<String>;

    /// Compute the info-hash of a metainfo source without adding it.
    async fn info_hash(&self, source: TorrentSource) -> TorrentResult<InfoHash>;

    /// Admit a torrent into the session.
    async fn add_torrent(&self, request: AddTorrent) -> TorrentResult<InfoHash>;

    /// Author a new torrent from a file or directory.
    async fn create_torrent(&self, request: CreateTorrent) -> TorrentResult<CreatedTorrent>;

    /// Remove a torrent from the session, leaving its data on disk.
    async fn remove_torrent(&self, handle: TorrentHandle) -> TorrentResult<()>;

    /// Snapshot every torrent in the session.
    async fn list(&self) -> TorrentResult<Vec<TorrentDescriptor>>;

    /// Swarm snapshot for one torrent; `None` when it is not in the session.
    async fn swarm(&self, info_hash: InfoHash) -> TorrentResult<Option<SwarmInfo>> {
        let _ = info_hash;
        Err(TorrentError::Unsupported { operation: "swarm" })
    }

    /// Directory holding a torrent's content; `None` when it is not in the session.
    async fn save_path(&self, handle: TorrentHandle) -> TorrentResult<Option<PathBuf>>;

    /// Resume a stopped torrent; default implementation reports lack of support.
    async fn start(&self, info_hash: InfoHash) -> TorrentResult<()> {
        let _ = info_hash;
        Err(TorrentError::Unsupported { operation: "start" })
    }

    /// Stop a torrent without removing it; default implementation reports lack of support.
    async fn stop(&self, info_hash: InfoHash) -> TorrentResult<()> {
        let _ = info_hash;
        Err(TorrentError::Unsupported { operation: "stop" })
    }

    /// Whether a torrent is in the session and running.
    async fn is_active(&self, info_hash: InfoHash) -> TorrentResult<bool>;

    /// Release every engine-held resource. Must be safe to call repeatedly.
    async fn cleanup(&self) -> TorrentResult<()>;
}
