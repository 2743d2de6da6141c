//! Recording engine double for exercising callers without real hashing.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use audyn_torrent_core::{
    AddTorrent, CreateTorrent, CreatedTorrent, InfoHash, SwarmInfo, TorrentDescriptor,
    TorrentEngine, TorrentError, TorrentHandle, TorrentResult, TorrentSource,
};

/// Info-hash returned by every successful identity-producing call.
pub const RECORDED_HASH: InfoHash = InfoHash::from_bytes([0xab; 20]);

/// Engine call observed by [`RecordingEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    /// `version`
    Version,
    /// `info_hash`
    InfoHash(TorrentSource),
    /// `add_torrent`
    Add(AddTorrent),
    /// `create_torrent`
    Create(CreateTorrent),
    /// `remove_torrent`
    Remove(TorrentHandle),
    /// `list`
    List,
    /// `swarm`
    Swarm(InfoHash),
    /// `save_path`
    SavePath(TorrentHandle),
    /// `start`
    Start(InfoHash),
    /// `stop`
    Stop(InfoHash),
    /// `is_active`
    IsActive(InfoHash),
    /// `cleanup`
    Cleanup,
}

/// Engine that records every call and answers with canned values.
#[derive(Default)]
pub struct RecordingEngine {
    calls: Mutex<Vec<RecordedCall>>,
    failure: Option<fn() -> TorrentError>,
    torrents: Vec<TorrentDescriptor>,
    save_path: Option<PathBuf>,
}

impl RecordingEngine {
    /// Engine that succeeds with empty results.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every fallible call fail with the error produced by `failure`.
    #[must_use]
    pub fn failing_with(mut self, failure: fn() -> TorrentError) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Torrents reported by `list`.
    #[must_use]
    pub fn with_torrents(mut self, torrents: Vec<TorrentDescriptor>) -> Self {
        self.torrents = torrents;
        self
    }

    /// Path reported by `save_path`.
    #[must_use]
    pub fn with_save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_path = Some(path.into());
        self
    }

    /// Calls observed so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: RecordedCall) -> TorrentResult<()> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        self.failure.map_or(Ok(()), |failure| Err(failure()))
    }
}

#[async_trait]
impl TorrentEngine for RecordingEngine {
    async fn version(&self) -> TorrentResult<String> {
        self.record(RecordedCall::Version)?;
        Ok("recording 0.0.0".into())
    }

    async fn info_hash(&self, source: TorrentSource) -> TorrentResult<InfoHash> {
        self.record(RecordedCall::InfoHash(source))?;
        Ok(RECORDED_HASH)
    }

    async fn add_torrent(&self, request: AddTorrent) -> TorrentResult<InfoHash> {
        self.record(RecordedCall::Add(request))?;
        Ok(RECORDED_HASH)
    }

    async fn create_torrent(&self, request: CreateTorrent) -> TorrentResult<CreatedTorrent> {
        let written_to = request.output.clone();
        self.record(RecordedCall::Create(request))?;
        Ok(CreatedTorrent {
            info_hash: RECORDED_HASH,
            metainfo: b"d4:infod4:name4:fakeee".to_vec(),
            written_to,
        })
    }

    async fn remove_torrent(&self, handle: TorrentHandle) -> TorrentResult<()> {
        self.record(RecordedCall::Remove(handle))
    }

    async fn list(&self) -> TorrentResult<Vec<TorrentDescriptor>> {
        self.record(RecordedCall::List)?;
        Ok(self.torrents.clone())
    }

    async fn swarm(&self, info_hash: InfoHash) -> TorrentResult<Option<SwarmInfo>> {
        self.record(RecordedCall::Swarm(info_hash))?;
        Ok(None)
    }

    async fn save_path(&self, handle: TorrentHandle) -> TorrentResult<Option<PathBuf>> {
        self.record(RecordedCall::SavePath(handle))?;
        Ok(self.save_path.clone())
    }

    async fn start(&self, info_hash: InfoHash) -> TorrentResult<()> {
        self.record(RecordedCall::Start(info_hash))
    }

    async fn stop(&self, info_hash: InfoHash) -> TorrentResult<()> {
        self.record(RecordedCall::Stop(info_hash))
    }

    async fn is_active(&self, info_hash: InfoHash) -> TorrentResult<bool> {
        self.record(RecordedCall::IsActive(info_hash))?;
        Ok(true)
    }

    async fn cleanup(&self) -> TorrentResult<()> {
        self.record(RecordedCall::Cleanup)
    }
}
